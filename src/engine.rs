//! Recommendation pipeline.
//!
//! Wires profiling, retrieval, context assembly, generation, mention
//! extraction, and enrichment into one flow. Every query resolves to a
//! displayable turn: upstream failures degrade to fallback text instead of
//! propagating to the interface layer.

use crate::config::{Prompts, Settings};
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::generation::{GenerationOrchestrator, OpenAIGenerator};
use crate::index::VectorIndex;
use crate::mentions::extract_mentions;
use crate::metadata::{Enricher, TmdbClient};
use crate::profile::Profiler;
use crate::retrieval::{ContextAssembler, Retriever};
use crate::session::{Session, Turn};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Fallback text shown when the movie library cannot be searched.
const RETRIEVAL_FALLBACK: &str =
    "I couldn't search the movie library just now. Please try again in a moment.";

/// The main recommendation engine.
pub struct RecommendEngine {
    retriever: Retriever,
    assembler: ContextAssembler,
    profiler: Option<Profiler>,
    orchestrator: GenerationOrchestrator,
    enricher: Enricher,
    top_k: usize,
}

impl RecommendEngine {
    /// Create an engine over a built index, wiring the OpenAI and TMDB
    /// backends from settings.
    pub fn new(settings: &Settings, index: Arc<VectorIndex>) -> Result<Self> {
        // Load prompts (with optional custom directory and variables)
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let retriever = Retriever::new(embedder, index);

        let profiler = if settings.profile.enabled {
            info!("Taste profiling enabled ({})", settings.profile.model);
            Some(Profiler::new(
                Arc::new(OpenAIGenerator::new(
                    &settings.profile.model,
                    settings.profile.temperature,
                )),
                prompts.clone(),
            ))
        } else {
            None
        };

        let generator = Arc::new(OpenAIGenerator::new(
            &settings.generation.model,
            settings.generation.temperature,
        ));
        let orchestrator = GenerationOrchestrator::new(generator, prompts, &settings.generation);

        let tmdb = TmdbClient::new(&settings.metadata, settings.metadata_api_key());
        let enricher = Enricher::new(Arc::new(tmdb), settings.metadata.max_concurrent);

        Ok(Self {
            retriever,
            assembler: ContextAssembler::new(&settings.context),
            profiler,
            orchestrator,
            enricher,
            top_k: settings.retrieval.top_k,
        })
    }

    /// Create an engine with custom components.
    pub fn with_components(
        retriever: Retriever,
        assembler: ContextAssembler,
        profiler: Option<Profiler>,
        orchestrator: GenerationOrchestrator,
        enricher: Enricher,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            assembler,
            profiler,
            orchestrator,
            enricher,
            top_k,
        }
    }

    /// Run the full pipeline for one query.
    ///
    /// Never fails: retrieval and generation failures resolve to a fallback
    /// turn marked `failed`.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn respond(&self, query: &str) -> Turn {
        // Profiling sharpens the retrieval query; the generator always sees
        // the user's own words.
        let retrieval_query = match &self.profiler {
            Some(profiler) => match profiler.profile(query).await {
                Ok(profile) => {
                    let prompt = profile.search_prompt();
                    debug!("Retrieval query from profile: {}", prompt);
                    prompt
                }
                Err(e) => {
                    warn!("Profiling failed, retrieving on raw query: {}", e);
                    query.to_string()
                }
            },
            None => query.to_string(),
        };

        let candidates = match self.retriever.retrieve(&retrieval_query, self.top_k).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!("Retrieval failed: {}", e);
                return Turn::assistant(RETRIEVAL_FALLBACK.to_string(), Vec::new(), true);
            }
        };

        let context = self.assembler.assemble(&candidates);
        debug!(
            "Grounding on {} of {} candidates",
            context.included(),
            candidates.len()
        );

        let response = self.orchestrator.generate(query, context.text()).await;
        if !response.succeeded {
            return Turn::assistant(response.text, Vec::new(), true);
        }

        let mentions = extract_mentions(&response.text);
        debug!("Extracted {} mentions", mentions.len());
        let movies = self.enricher.enrich(&mentions).await;

        Turn::assistant(response.text, movies, false)
    }

    /// Run one conversational turn against a session.
    ///
    /// Enforces the session machine: the submission is rejected while a
    /// response is in flight, and both success and fallback outcomes append
    /// an assistant turn and return the session to Idle.
    pub async fn run_turn<'s>(&self, session: &'s mut Session, text: &str) -> Result<&'s Turn> {
        let accepted = session.submit(text)?;
        let turn = self.respond(&accepted).await;
        session.complete(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContextSettings, GenerationSettings};
    use crate::corpus::MovieRecord;
    use crate::embedding::Embedder;
    use crate::error::CineMindError;
    use crate::generation::Generator;
    use crate::metadata::{MetadataProvider, MovieDetails};
    use crate::session::SessionPhase;
    use async_trait::async_trait;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }

        fn dimensions(&self) -> usize {
            self.0.len()
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(CineMindError::Embedding("rate limited".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(CineMindError::Embedding("rate limited".to_string()))
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Echoes back a canned reply, capturing the user prompt it was given.
    struct CannedGenerator {
        reply: Option<String>,
        last_user: std::sync::Mutex<String>,
    }

    impl CannedGenerator {
        fn new(reply: Option<&str>) -> Self {
            Self {
                reply: reply.map(|s| s.to_string()),
                last_user: std::sync::Mutex::new(String::new()),
            }
        }
    }

    #[async_trait]
    impl Generator for CannedGenerator {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            *self.last_user.lock().unwrap() = user.to_string();
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(CineMindError::Generation("simulated outage".to_string())),
            }
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    struct StubMetadata;

    #[async_trait]
    impl MetadataProvider for StubMetadata {
        fn is_configured(&self) -> bool {
            true
        }

        async fn lookup(&self, title: &str, _year: Option<&str>) -> Result<Option<MovieDetails>> {
            Ok(Some(MovieDetails {
                canonical_title: title.to_string(),
                poster_url: Some(format!("https://posters.test/{}.jpg", title)),
                rating: Some(8.4),
                overview: Some("An overview.".to_string()),
            }))
        }
    }

    fn movie(id: u64, title: &str, year: u16, overview: &str) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            year: Some(year),
            overview: overview.to_string(),
            genres: vec!["Sci-Fi".to_string()],
            popularity: 10.0,
        }
    }

    fn sci_fi_index() -> Arc<VectorIndex> {
        let index = VectorIndex::new();
        index
            .build(vec![
                (
                    movie(1, "Interstellar", 2014, "Explorers cross a wormhole."),
                    vec![1.0, 0.0],
                ),
                (
                    movie(2, "Arrival", 2016, "A linguist decodes an alien language."),
                    vec![0.9, 0.1],
                ),
            ])
            .unwrap();
        Arc::new(index)
    }

    fn engine_with(
        embedder: Arc<dyn Embedder>,
        generator: Arc<CannedGenerator>,
        index: Arc<VectorIndex>,
    ) -> RecommendEngine {
        let settings = GenerationSettings {
            timeout_seconds: 1,
            max_retries: 1,
            backoff_ms: 1,
            ..GenerationSettings::default()
        };
        RecommendEngine::with_components(
            Retriever::new(embedder, index),
            ContextAssembler::new(&ContextSettings::default()),
            None,
            GenerationOrchestrator::new(generator, Prompts::default(), &settings),
            Enricher::new(Arc::new(StubMetadata), 8),
            5,
        )
    }

    #[tokio::test]
    async fn test_end_to_end_grounded_response() {
        let generator = Arc::new(CannedGenerator::new(Some(
            "You should watch **Interstellar (2014)** first.",
        )));
        let engine = engine_with(
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            generator.clone(),
            sci_fi_index(),
        );

        let turn = engine.respond("sci-fi like Interstellar").await;

        // The grounding block handed to the generator references the corpus.
        let prompt = generator.last_user.lock().unwrap().clone();
        assert!(prompt.contains("Interstellar (2014)"));
        assert!(prompt.contains("Arrival (2016)"));
        assert!(prompt.contains("sci-fi like Interstellar"));

        assert!(!turn.failed);
        assert_eq!(turn.movies.len(), 1);
        assert_eq!(turn.movies[0].title(), "Interstellar");
        assert_eq!(turn.movies[0].year(), "2014");
        assert!(turn.movies[0].poster_url.is_some());
    }

    #[tokio::test]
    async fn test_embedding_outage_degrades_to_failed_turn() {
        let generator = Arc::new(CannedGenerator::new(Some("unused")));
        let engine = engine_with(Arc::new(BrokenEmbedder), generator, sci_fi_index());

        let turn = engine.respond("anything").await;
        assert!(turn.failed);
        assert!(!turn.text.is_empty());
        assert!(turn.movies.is_empty());
    }

    #[tokio::test]
    async fn test_generation_outage_degrades_to_failed_turn() {
        let generator = Arc::new(CannedGenerator::new(None));
        let engine = engine_with(
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            generator,
            sci_fi_index(),
        );

        let mut session = Session::new();
        let turn = engine.run_turn(&mut session, "space movies").await.unwrap();
        assert!(turn.failed);
        assert!(!turn.text.is_empty());

        // Fallback still resolves the session back to Idle.
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.turns().len(), 2);
    }

    #[tokio::test]
    async fn test_run_turn_rejects_empty_submission() {
        let generator = Arc::new(CannedGenerator::new(Some("unused")));
        let engine = engine_with(
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            generator,
            sci_fi_index(),
        );

        let mut session = Session::new();
        assert!(engine.run_turn(&mut session, "   ").await.is_err());
        assert!(session.turns().is_empty());
    }
}
