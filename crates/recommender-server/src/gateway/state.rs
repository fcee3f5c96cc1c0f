use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info};

use recommender::embedding::EmbeddingProvider;
use recommender::engine::{EngineResult, RetrievalEngine};

use crate::gateway::error::GatewayError;

/// Readiness slot contents.
pub enum EngineStatus<E: EmbeddingProvider> {
    /// Build still running.
    Loading,
    Ready(Arc<RetrievalEngine<E>>),
    /// Build failed; the service stays up and answers 503.
    Failed(String),
}

impl<E: EmbeddingProvider> Clone for EngineStatus<E> {
    fn clone(&self) -> Self {
        match self {
            EngineStatus::Loading => EngineStatus::Loading,
            EngineStatus::Ready(engine) => EngineStatus::Ready(Arc::clone(engine)),
            EngineStatus::Failed(reason) => EngineStatus::Failed(reason.clone()),
        }
    }
}

impl<E: EmbeddingProvider> EngineStatus<E> {
    pub fn label(&self) -> &'static str {
        match self {
            EngineStatus::Loading => "loading",
            EngineStatus::Ready(_) => "ready",
            EngineStatus::Failed(_) => "failed",
        }
    }
}

pub struct HandlerState<E: EmbeddingProvider + 'static> {
    pub engine: Arc<RwLock<EngineStatus<E>>>,

    /// Results per `/recommend` call.
    pub top_k: usize,

    pub cors_origins: Arc<[String]>,
}

impl<E: EmbeddingProvider + 'static> Clone for HandlerState<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            top_k: self.top_k,
            cors_origins: Arc::clone(&self.cors_origins),
        }
    }
}

impl<E: EmbeddingProvider + 'static> HandlerState<E> {
    /// State with an empty (loading) readiness slot.
    pub fn new(top_k: usize, cors_origins: Vec<String>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(EngineStatus::Loading)),
            top_k,
            cors_origins: cors_origins.into(),
        }
    }

    /// State whose engine is already built.
    pub fn with_engine(engine: RetrievalEngine<E>, top_k: usize, cors_origins: Vec<String>) -> Self {
        let state = Self::new(top_k, cors_origins);
        state.publish(engine);
        state
    }

    pub fn publish(&self, engine: RetrievalEngine<E>) {
        *self.engine.write() = EngineStatus::Ready(Arc::new(engine));
    }

    pub fn fail(&self, reason: impl Into<String>) {
        *self.engine.write() = EngineStatus::Failed(reason.into());
    }

    pub fn status(&self) -> EngineStatus<E> {
        self.engine.read().clone()
    }

    /// The published engine, or the 503 to answer with.
    pub fn ready_engine(&self) -> Result<Arc<RetrievalEngine<E>>, GatewayError> {
        match &*self.engine.read() {
            EngineStatus::Ready(engine) => Ok(Arc::clone(engine)),
            EngineStatus::Loading => Err(GatewayError::NotReady("engine is still loading".into())),
            EngineStatus::Failed(reason) => Err(GatewayError::NotReady(format!(
                "engine failed to load: {reason}"
            ))),
        }
    }

    /// Runs `build` on the blocking pool and publishes its outcome into the readiness slot.
    pub fn spawn_engine_build<F>(&self, build: F) -> JoinHandle<()>
    where
        F: FnOnce() -> EngineResult<RetrievalEngine<E>> + Send + 'static,
    {
        let state = self.clone();
        tokio::spawn(async move {
            match tokio::task::spawn_blocking(build).await {
                Ok(Ok(engine)) => {
                    info!(rows = engine.len(), "Engine published");
                    state.publish(engine);
                }
                Ok(Err(e)) => {
                    error!(error = %e, configuration = e.is_configuration(), "Engine build failed");
                    state.fail(e.to_string());
                }
                Err(e) => {
                    error!(error = %e, "Engine build task panicked");
                    state.fail(format!("engine build task panicked: {e}"));
                }
            }
        })
    }
}
