//! CineMind - Grounded Movie Recommendations
//!
//! A movie recommendation engine that answers free-text requests with
//! retrieval-augmented generation: semantically similar movies are pulled
//! from a vector index, an LLM is grounded on them, and the cited titles in
//! its reply are enriched with display metadata.
//!
//! # Overview
//!
//! CineMind allows you to:
//! - Ask for recommendations in plain language and get grounded suggestions
//! - Chat across multiple turns with an append-only session log
//! - Search the movie corpus directly by semantic similarity
//! - Serve the pipeline over HTTP for other frontends
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `corpus` - Corpus artifact loading
//! - `index` - In-memory vector index with copy-on-write rebuilds
//! - `embedding` - Embedding generation
//! - `profile` - Taste profile extraction
//! - `retrieval` - Query retrieval and grounding context assembly
//! - `generation` - Generation orchestration with retry/timeout policy
//! - `mentions` - Movie citation extraction from generated text
//! - `metadata` - Concurrent display-metadata enrichment
//! - `session` - Conversation session state
//! - `engine` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use cinemind::config::Settings;
//! use cinemind::corpus::Corpus;
//! use cinemind::engine::RecommendEngine;
//! use cinemind::index::VectorIndex;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!
//!     let corpus = Corpus::load(&settings.artifact_path())?;
//!     let index = VectorIndex::new();
//!     index.build(corpus.into_vectors()?)?;
//!
//!     let engine = RecommendEngine::new(&settings, Arc::new(index))?;
//!     let turn = engine.respond("thought-provoking sci-fi like Arrival").await;
//!     println!("{}", turn.text);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generation;
pub mod index;
pub mod mentions;
pub mod metadata;
pub mod openai;
pub mod profile;
pub mod retrieval;
pub mod session;

pub use error::{CineMindError, Result};
