//! Orchestrates the three external call categories: product analysis,
//! prompt-set generation, and per-poster image rendering.
//!
//! The backend is injected through [`GenerationBackend`] so the whole flow
//! runs against a fake in tests. Parsed prompt records live in an
//! addressable id→record map; each render mutates only its own entry and
//! the map lock is never held across an await, so concurrent renders for
//! distinct ids stay independent.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::{find_typo_style, find_visual_style};
use crate::client::GenAiClient;
use crate::error::{PpsError, Result};
use crate::parser::parse_or_fallback;
use crate::reference::EncodedImage;
use crate::template::render_prompt;
use crate::types::{AnalysisResult, AspectRatio, GenerationOptions, ParsedPrompt, TypoStyle, VisualStyle};

/// The external generation service as seen by the orchestrator.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn analyze_images(
        &self,
        images: &[EncodedImage],
        description: &str,
    ) -> Result<AnalysisResult>;

    async fn analyze_text(&self, description: &str) -> Result<AnalysisResult>;

    async fn generate_text(&self, prompt: &str) -> Result<String>;

    async fn generate_image(
        &self,
        prompt: &str,
        reference_images: &[EncodedImage],
        ratio: AspectRatio,
    ) -> Result<String>;
}

#[async_trait]
impl GenerationBackend for GenAiClient {
    async fn analyze_images(
        &self,
        images: &[EncodedImage],
        description: &str,
    ) -> Result<AnalysisResult> {
        GenAiClient::analyze_images(self, images, description).await
    }

    async fn analyze_text(&self, description: &str) -> Result<AnalysisResult> {
        GenAiClient::analyze_text(self, description).await
    }

    async fn generate_text(&self, prompt: &str) -> Result<String> {
        GenAiClient::generate_text(self, prompt).await
    }

    async fn generate_image(
        &self,
        prompt: &str,
        reference_images: &[EncodedImage],
        ratio: AspectRatio,
    ) -> Result<String> {
        GenAiClient::generate_image(self, prompt, reference_images, ratio).await
    }
}

/// Sequences analysis, prompt-set generation, and per-poster rendering on
/// top of an injected backend.
pub struct PosterStudio<B: GenerationBackend> {
    backend: B,
    reference_images: Vec<EncodedImage>,
    analysis: Option<AnalysisResult>,
    visual_style: Option<&'static VisualStyle>,
    typo_style: Option<&'static TypoStyle>,
    options: GenerationOptions,
    prompts: Mutex<BTreeMap<usize, ParsedPrompt>>,
}

impl<B: GenerationBackend> PosterStudio<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            reference_images: Vec::new(),
            analysis: None,
            visual_style: None,
            typo_style: None,
            options: GenerationOptions::default(),
            prompts: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn set_reference_images(&mut self, images: Vec<EncodedImage>) {
        self.reference_images = images;
    }

    pub fn reference_images(&self) -> &[EncodedImage] {
        &self.reference_images
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// Installs a previously obtained analysis, skipping the analysis call.
    pub fn set_analysis(&mut self, analysis: AnalysisResult) {
        self.analysis = Some(analysis);
    }

    pub fn select_visual_style(&mut self, id: &str) -> Result<()> {
        self.visual_style = Some(
            find_visual_style(id)
                .ok_or_else(|| PpsError::Config(format!("Unknown visual style '{id}'")))?,
        );
        Ok(())
    }

    pub fn select_typo_style(&mut self, id: &str) -> Result<()> {
        self.typo_style = Some(
            find_typo_style(id)
                .ok_or_else(|| PpsError::Config(format!("Unknown typography style '{id}'")))?,
        );
        Ok(())
    }

    pub fn set_options(&mut self, options: GenerationOptions) {
        self.options = options;
    }

    /// Runs the analysis call over the configured reference images (or the
    /// text-only variant when there are none).
    ///
    /// A non-empty `brand_override` is prepended to the outbound description
    /// as a labeled prefix, and unconditionally overwrites the returned
    /// `brand_name`; the local override always wins over the service's
    /// inference.
    pub async fn analyze(
        &mut self,
        description: &str,
        brand_override: &str,
    ) -> Result<&AnalysisResult> {
        let brand_override = brand_override.trim();
        let outbound = if brand_override.is_empty() {
            description.to_string()
        } else {
            format!("品牌名称: {brand_override}\n{description}")
        };

        let mut analysis = if self.reference_images.is_empty() {
            self.backend.analyze_text(&outbound).await?
        } else {
            self.backend
                .analyze_images(&self.reference_images, &outbound)
                .await?
        };

        if !brand_override.is_empty() {
            analysis.brand_name = brand_override.to_string();
        }

        Ok(self.analysis.insert(analysis))
    }

    /// Generates a fresh prompt set. The previous set is cleared before the
    /// call is issued, so readers never observe stale records alongside an
    /// in-flight request.
    pub async fn generate_prompt_set(&self) -> Result<Vec<ParsedPrompt>> {
        let analysis = self.analysis.as_ref().ok_or_else(|| {
            PpsError::precondition("No analysis available; analyze the product first")
        })?;
        let style = self
            .visual_style
            .ok_or_else(|| PpsError::precondition("No visual style selected"))?;
        let typo = self
            .typo_style
            .ok_or_else(|| PpsError::precondition("No typography style selected"))?;

        self.lock_prompts().clear();

        let request = render_prompt(analysis, style, typo, &self.options);
        let raw = self.backend.generate_text(&request).await?;
        let parsed = parse_or_fallback(&raw);

        let mut prompts = self.lock_prompts();
        prompts.clear();
        for record in &parsed {
            prompts.insert(record.id, record.clone());
        }
        Ok(parsed)
    }

    /// Installs a previously generated prompt set, replacing the current map.
    pub fn set_prompts(&mut self, prompts: Vec<ParsedPrompt>) {
        let mut map = self.lock_prompts();
        map.clear();
        for record in prompts {
            map.insert(record.id, record);
        }
    }

    /// Snapshot of the current prompt records, ordered by id.
    pub fn prompts(&self) -> Vec<ParsedPrompt> {
        self.lock_prompts().values().cloned().collect()
    }

    pub fn is_generating(&self, id: usize) -> bool {
        self.lock_prompts()
            .get(&id)
            .map(|p| p.is_generating)
            .unwrap_or(false)
    }

    /// Renders one poster image for the record with the given id.
    ///
    /// Refused before any network call when the record is missing, its
    /// English prompt is empty, or no reference image is configured. The
    /// record's in-flight flag is set for the duration of the call and
    /// cleared on success and failure alike; failures propagate.
    pub async fn render_poster(&self, id: usize) -> Result<ParsedPrompt> {
        if self.reference_images.is_empty() {
            return Err(PpsError::precondition(
                "No reference image available for rendering",
            ));
        }

        let (prompt, ratio) = {
            let mut prompts = self.lock_prompts();
            let record = prompts.get_mut(&id).ok_or_else(|| {
                PpsError::precondition(format!("No prompt record with id {id}"))
            })?;
            if record.english_prompt.trim().is_empty() {
                return Err(PpsError::precondition(format!(
                    "Poster {id} has no extracted English prompt"
                )));
            }
            record.is_generating = true;
            (record.english_prompt.clone(), self.options.aspect_ratio)
        };

        let outcome = self
            .backend
            .generate_image(&prompt, &self.reference_images, ratio)
            .await;

        let mut prompts = self.lock_prompts();
        match outcome {
            Ok(image) => {
                // The set may have been replaced while the call was in
                // flight; a missing entry just drops the result.
                if let Some(record) = prompts.get_mut(&id) {
                    record.is_generating = false;
                    record.generated_image = Some(image);
                    return Ok(record.clone());
                }
                Err(PpsError::precondition(format!(
                    "Prompt record {id} was replaced while rendering"
                )))
            }
            Err(err) => {
                if let Some(record) = prompts.get_mut(&id) {
                    record.is_generating = false;
                }
                Err(err)
            }
        }
    }

    fn lock_prompts(&self) -> std::sync::MutexGuard<'_, BTreeMap<usize, ParsedPrompt>> {
        self.prompts.lock().expect("prompt map lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeState {
        text_payload: Mutex<String>,
        calls: Mutex<Vec<String>>,
        last_description: Mutex<String>,
        text_entered: Notify,
        text_gated: std::sync::atomic::AtomicBool,
        text_release: Notify,
        image_gates: Mutex<HashMap<String, Arc<Notify>>>,
        failing_prompts: Mutex<Vec<String>>,
    }

    #[derive(Clone, Default)]
    struct FakeBackend(Arc<FakeState>);

    impl FakeBackend {
        fn with_text(payload: &str) -> Self {
            let fake = FakeBackend::default();
            *fake.0.text_payload.lock().unwrap() = payload.to_string();
            fake
        }

        fn gate_image(&self, prompt: &str) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.0
                .image_gates
                .lock()
                .unwrap()
                .insert(prompt.to_string(), gate.clone());
            gate
        }

        fn fail_prompt(&self, prompt: &str) {
            self.0
                .failing_prompts
                .lock()
                .unwrap()
                .push(prompt.to_string());
        }
    }

    fn sample_analysis() -> AnalysisResult {
        AnalysisResult {
            brand_name: "推断品牌".to_string(),
            product_type: "挂耳咖啡".to_string(),
            ..Default::default()
        }
    }

    #[async_trait]
    impl GenerationBackend for FakeBackend {
        async fn analyze_images(
            &self,
            _images: &[EncodedImage],
            description: &str,
        ) -> Result<AnalysisResult> {
            self.0.calls.lock().unwrap().push("analyze_images".into());
            *self.0.last_description.lock().unwrap() = description.to_string();
            Ok(sample_analysis())
        }

        async fn analyze_text(&self, description: &str) -> Result<AnalysisResult> {
            self.0.calls.lock().unwrap().push("analyze_text".into());
            *self.0.last_description.lock().unwrap() = description.to_string();
            Ok(sample_analysis())
        }

        async fn generate_text(&self, _prompt: &str) -> Result<String> {
            self.0.calls.lock().unwrap().push("generate_text".into());
            if self.0.text_gated.load(std::sync::atomic::Ordering::SeqCst) {
                self.0.text_entered.notify_one();
                self.0.text_release.notified().await;
            }
            Ok(self.0.text_payload.lock().unwrap().clone())
        }

        async fn generate_image(
            &self,
            prompt: &str,
            _reference_images: &[EncodedImage],
            _ratio: AspectRatio,
        ) -> Result<String> {
            let gate = self.0.image_gates.lock().unwrap().get(prompt).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if self.0.failing_prompts.lock().unwrap().contains(&prompt.to_string()) {
                return Err(PpsError::api(None, "image generation failed"));
            }
            Ok(format!("img::{prompt}"))
        }
    }

    const TWO_POSTERS: &str = "\
### 海报01 | 主KV视觉
**提示词 (中文)**: 黛蓝背景
**Prompt (English)**: poster zero

### 海报02 | 生活场景
**提示词 (中文)**: 清晨窗边
**Prompt (English)**: poster one
";

    fn reference_image() -> EncodedImage {
        EncodedImage {
            mime_type: "image/jpeg".to_string(),
            data: "QUJD".to_string(),
        }
    }

    fn ready_studio(backend: FakeBackend) -> PosterStudio<FakeBackend> {
        let mut studio = PosterStudio::new(backend);
        studio.set_reference_images(vec![reference_image()]);
        studio.set_analysis(sample_analysis());
        studio.select_visual_style("magazine").unwrap();
        studio.select_typo_style("serif_magazine").unwrap();
        studio
    }

    #[tokio::test]
    async fn analyze_prepends_brand_label_and_overrides_result() {
        let backend = FakeBackend::default();
        let state = backend.0.clone();
        let mut studio = PosterStudio::new(backend);
        studio.set_reference_images(vec![reference_image()]);

        let analysis = studio.analyze("高山咖啡豆", "山雾").await.unwrap();
        assert_eq!(analysis.brand_name, "山雾");

        let outbound = state.last_description.lock().unwrap().clone();
        assert!(outbound.starts_with("品牌名称: 山雾\n"));
        assert!(outbound.contains("高山咖啡豆"));
    }

    #[tokio::test]
    async fn analyze_without_override_keeps_inferred_brand() {
        let mut studio = PosterStudio::new(FakeBackend::default());
        studio.set_reference_images(vec![reference_image()]);

        let analysis = studio.analyze("高山咖啡豆", "  ").await.unwrap();
        assert_eq!(analysis.brand_name, "推断品牌");
    }

    #[tokio::test]
    async fn analyze_without_images_takes_text_path() {
        let backend = FakeBackend::default();
        let state = backend.0.clone();
        let mut studio = PosterStudio::new(backend);

        studio.analyze("描述", "").await.unwrap();
        assert_eq!(state.calls.lock().unwrap().as_slice(), ["analyze_text"]);
    }

    #[tokio::test]
    async fn generate_prompt_set_rejects_missing_selections() {
        let mut studio = PosterStudio::new(FakeBackend::with_text(TWO_POSTERS));

        let err = studio.generate_prompt_set().await.unwrap_err();
        assert!(matches!(err, PpsError::Precondition(_)));

        studio.set_analysis(sample_analysis());
        let err = studio.generate_prompt_set().await.unwrap_err();
        assert!(err.to_string().contains("visual style"));

        studio.select_visual_style("tech").unwrap();
        let err = studio.generate_prompt_set().await.unwrap_err();
        assert!(err.to_string().contains("typography"));

        // No network call was made for any of the rejections.
        // (generate_text would have been recorded by the fake.)
    }

    #[tokio::test]
    async fn precondition_failures_never_reach_the_backend() {
        let backend = FakeBackend::with_text(TWO_POSTERS);
        let state = backend.0.clone();
        let studio = PosterStudio::new(backend);

        let _ = studio.generate_prompt_set().await;
        assert!(state.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generate_prompt_set_parses_records() {
        let studio = ready_studio(FakeBackend::with_text(TWO_POSTERS));
        let prompts = studio.generate_prompt_set().await.unwrap();

        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].english_prompt, "poster zero");
        assert_eq!(prompts[1].english_prompt, "poster one");
        assert_eq!(studio.prompts().len(), 2);
    }

    #[tokio::test]
    async fn generate_prompt_set_falls_back_on_unstructured_text() {
        let studio = ready_studio(FakeBackend::with_text("自由文本，没有结构"));
        let prompts = studio.generate_prompt_set().await.unwrap();

        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].id, 0);
        assert_eq!(prompts[0].chinese_prompt, "自由文本，没有结构");
    }

    #[tokio::test]
    async fn new_generation_clears_previous_set_before_resuming() {
        let backend = FakeBackend::with_text(TWO_POSTERS);
        let state = backend.0.clone();
        let studio = Arc::new(ready_studio(backend));

        studio.generate_prompt_set().await.unwrap();
        assert_eq!(studio.prompts().len(), 2);

        state
            .text_gated
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let studio2 = studio.clone();
        let task = tokio::spawn(async move { studio2.generate_prompt_set().await });

        state.text_entered.notified().await;
        assert!(
            studio.prompts().is_empty(),
            "previous set must be cleared while the new call is in flight"
        );

        state.text_release.notify_one();
        let prompts = task.await.unwrap().unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(studio.prompts().len(), 2);
    }

    #[tokio::test]
    async fn render_poster_rejects_missing_preconditions() {
        let studio = ready_studio(FakeBackend::with_text(
            "### 海报01 | 无英文\n**提示词 (中文)**: 只有中文\n",
        ));
        studio.generate_prompt_set().await.unwrap();

        let err = studio.render_poster(0).await.unwrap_err();
        assert!(err.to_string().contains("English prompt"));

        let err = studio.render_poster(9).await.unwrap_err();
        assert!(err.to_string().contains("id 9"));
    }

    #[tokio::test]
    async fn render_poster_requires_reference_image() {
        let backend = FakeBackend::with_text(TWO_POSTERS);
        let mut studio = PosterStudio::new(backend);
        studio.set_analysis(sample_analysis());
        studio.select_visual_style("magazine").unwrap();
        studio.select_typo_style("serif_magazine").unwrap();
        studio.generate_prompt_set().await.unwrap();

        let err = studio.render_poster(0).await.unwrap_err();
        assert!(err.to_string().contains("reference image"));
    }

    #[tokio::test]
    async fn render_poster_stores_image_and_clears_flag() {
        let studio = ready_studio(FakeBackend::with_text(TWO_POSTERS));
        studio.generate_prompt_set().await.unwrap();

        let record = studio.render_poster(0).await.unwrap();
        assert_eq!(record.generated_image.as_deref(), Some("img::poster zero"));
        assert!(!record.is_generating);
        assert!(!studio.is_generating(0));
    }

    #[tokio::test]
    async fn concurrent_renders_keep_flags_independent() {
        let backend = FakeBackend::with_text(TWO_POSTERS);
        let gate = backend.gate_image("poster one");
        let studio = Arc::new(ready_studio(backend));
        studio.generate_prompt_set().await.unwrap();

        let studio2 = studio.clone();
        let slow = tokio::spawn(async move { studio2.render_poster(1).await });
        // Let the spawned render reach its await point.
        tokio::task::yield_now().await;
        assert!(studio.is_generating(1));

        let fast = studio.render_poster(0).await.unwrap();
        assert!(fast.generated_image.is_some());
        assert!(!studio.is_generating(0));
        assert!(
            studio.is_generating(1),
            "finishing record 0 must not touch record 1's flag"
        );

        gate.notify_one();
        let slow_record = slow.await.unwrap().unwrap();
        assert_eq!(
            slow_record.generated_image.as_deref(),
            Some("img::poster one")
        );
        assert!(!studio.is_generating(1));
    }

    #[tokio::test]
    async fn render_failure_clears_flag_and_propagates() {
        let backend = FakeBackend::with_text(TWO_POSTERS);
        backend.fail_prompt("poster zero");
        let studio = ready_studio(backend);
        studio.generate_prompt_set().await.unwrap();

        let err = studio.render_poster(0).await.unwrap_err();
        assert!(matches!(err, PpsError::Api { .. }));
        assert!(!studio.is_generating(0));

        let record = &studio.prompts()[0];
        assert!(record.generated_image.is_none());
    }
}
