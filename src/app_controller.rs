use anyhow::{Result, Context, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::{SubtitleError, TranslationError};
use crate::file_utils::{FileManager, format_duration};
use crate::language_utils::language_label;
use crate::providers::Provider;
use crate::providers::google::GoogleTranslate;
use crate::segmentation;
use crate::subtitle_processor::{Cue, SubtitleCollection};
use crate::transcript::{Token, TokenSource, TranscriptFile};
use crate::translation::BatchTranslator;

// @module: Application controller for subtitle generation

/// Main application controller: transcript in, SRT out
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Translation provider, absent when translation is disabled
    provider: Option<Box<dyn Provider>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let provider: Option<Box<dyn Provider>> = if config.translation.enabled {
            Some(Box::new(GoogleTranslate::from_config(&config.translation, &config.source_language)))
        } else {
            None
        };

        Ok(Self { config, provider })
    }

    /// Create a controller that translates through the given provider
    pub fn with_provider(config: Config, provider: Box<dyn Provider>) -> Self {
        Self {
            config,
            provider: Some(provider),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether cues are translated before being written
    pub fn translates(&self) -> bool {
        self.config.translation.enabled && self.provider.is_some()
    }

    /// Group and merge tokens into final cues
    pub fn generate_cues(&self, tokens: &[Token]) -> Result<Vec<Cue>, SubtitleError> {
        let cues = segmentation::segment(tokens, &self.config.segmentation)?;
        debug!("Generated {} cues from {} tokens", cues.len(), tokens.len());
        Ok(cues)
    }

    /// Translate cues when translation is enabled; otherwise return them unchanged
    pub async fn translate_cues(&self, cues: Vec<Cue>) -> Result<Vec<Cue>, TranslationError> {
        let provider = match (&self.provider, self.config.translation.enabled) {
            (Some(provider), true) => provider.as_ref(),
            _ => return Ok(cues),
        };

        let translator = BatchTranslator::from_config(provider, &self.config.translation);
        let total_batches = cues.len().div_ceil(translator.batch_size());

        let progress_bar = ProgressBar::new(total_batches as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style);

        let result = translator
            .translate_with_progress(&cues, &self.config.target_language, |done, _| {
                progress_bar.set_position(done as u64);
            })
            .await;

        match &result {
            Ok(_) => progress_bar.finish_and_clear(),
            Err(e) => progress_bar.abandon_with_message(e.to_string()),
        }
        result
    }

    /// Verify the translation service answers before a long run
    pub async fn check_connection(&self) -> Result<()> {
        let provider = match (&self.provider, self.config.translation.enabled) {
            (Some(provider), true) => provider,
            _ => return Ok(()),
        };

        info!("Checking connection to {}...", provider.name());
        provider.test_connection().await
            .with_context(|| format!("Translation service {} is not reachable", provider.name()))
    }

    /// Output path for a transcript
    pub fn output_path(&self, input_file: &Path, output_dir: &Path) -> PathBuf {
        let language = self.translates().then_some(self.config.target_language.as_str());
        FileManager::generate_output_path(input_file, output_dir, language, "srt")
    }

    /// Turn a token source into a finished, possibly translated, collection
    pub async fn build_subtitles(&self, source: &dyn TokenSource, source_file: &Path) -> Result<SubtitleCollection> {
        info!("Step 1/3: Loading recognized tokens...");
        let tokens = source.load_tokens()?;
        info!("Loaded {} tokens", tokens.len());

        info!("Step 2/3: Segmenting tokens into cues...");
        let cues = self.generate_cues(&tokens)
            .context("Failed to segment recognized tokens")?;
        info!("Segmentation complete: {} cues", cues.len());

        let (cues, language) = if self.translates() {
            info!("Step 3/3: Translating cues to {}...", language_label(&self.config.target_language));
            let translated = self.translate_cues(cues).await?;
            info!("Translation complete: {} cues", translated.len());
            (translated, self.config.target_language.clone())
        } else {
            info!("Step 3/3: Translation disabled, keeping {} text", language_label(&self.config.source_language));
            (cues, self.config.source_language.clone())
        };

        Ok(SubtitleCollection::new(source_file.to_path_buf(), language, cues))
    }

    /// Run the main workflow for one transcript file
    ///
    /// Returns the written path, or `None` when an existing output was kept.
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<Option<PathBuf>> {
        let start_time = Instant::now();

        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        FileManager::ensure_dir(&output_dir)?;

        let output_path = self.output_path(&input_file, &output_dir);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", output_path);
            return Ok(None);
        }

        info!("Input transcript: {:?}", input_file);
        info!("Output subtitle: {:?}", output_path);

        let source = TranscriptFile::new(&input_file);
        let subtitles = self.build_subtitles(&source, &input_file).await?;

        let written = subtitles.write_to_srt(&output_path)?;

        info!(
            "Subtitle file created: {:?} ({} cues spanning {}) in {}",
            written,
            subtitles.cues.len(),
            format_duration(subtitles.span_seconds()),
            format_duration(start_time.elapsed().as_secs_f64())
        );

        Ok(Some(written))
    }

    /// Process every transcript (`.json`) under a directory
    ///
    /// Returns the number of files written. A quota error stops the run, any
    /// other per-file error is logged and the next file is processed.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<usize> {
        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let transcripts = FileManager::find_files(&input_dir, "json")?;
        info!("Found {} transcript(s) in {:?}", transcripts.len(), input_dir);

        if !transcripts.is_empty() {
            self.check_connection().await?;
        }

        let mut written_count = 0;
        for transcript in transcripts {
            let output_dir = transcript.parent().unwrap_or(Path::new(".")).to_path_buf();
            match self.run(transcript.clone(), output_dir, force_overwrite).await {
                Ok(Some(_)) => written_count += 1,
                Ok(None) => {}
                Err(e) if is_quota_error(&e) => return Err(e),
                Err(e) => error!("Error processing {:?}: {:#}", transcript, e),
            }
        }

        info!("Finished processing, {} subtitle file(s) written", written_count);
        Ok(written_count)
    }
}

fn is_quota_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.downcast_ref::<TranslationError>().is_some_and(TranslationError::is_quota_exceeded)
    })
}
