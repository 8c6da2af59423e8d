//! Component Birth Queue
//!
//! Neurogenesis is gated: new components are requested with a priority and
//! a justification, and admission happens in batches against the resource
//! budget. Emergency work (injury response, critical replacements) may
//! bypass the budget when the bypass is enabled - the one sanctioned way
//! to exceed `max_components`.
//!
//! Admission order is priority first, newest first within a priority.
//! Rejected requests stay queued for future evaluation.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ResourceConfig;
use crate::error::Result;
use crate::registry::{ComponentRecord, ComponentRegistry, ComponentType, Position3D};

// ============================================================================
// PRIORITY
// ============================================================================

/// Urgency of a birth request. Ordering is by urgency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "camelCase")]
pub enum BirthPriority {
    /// Opportunistic growth
    Low,
    /// Ordinary growth
    #[default]
    Medium,
    /// Needed soon; eligible for the capacity bypass
    High,
    /// Needed now; eligible for the capacity bypass
    Emergency,
}

impl BirthPriority {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BirthPriority::Low => "low",
            BirthPriority::Medium => "medium",
            BirthPriority::High => "high",
            BirthPriority::Emergency => "emergency",
        }
    }

    /// Whether this priority may use the capacity bypass
    pub fn is_bypass_eligible(&self) -> bool {
        *self >= BirthPriority::High
    }
}

impl std::fmt::Display for BirthPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// BIRTH REQUEST
// ============================================================================

/// A pending request to create a component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthRequest {
    /// Request id (UUID v4)
    pub request_id: String,
    /// Type of component to create
    pub component_type: ComponentType,
    /// Where to place it
    pub position: Position3D,
    /// Why it is needed
    pub justification: String,
    /// Admission urgency
    pub priority: BirthPriority,
    /// When the request was submitted
    pub requested_at: DateTime<Utc>,
    /// Who requested it
    pub requested_by: String,
    /// Opaque metadata copied onto the created record
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl BirthRequest {
    /// Build a request with a fresh id, stamped now
    pub fn new(
        component_type: ComponentType,
        position: Position3D,
        justification: impl Into<String>,
        priority: BirthPriority,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            component_type,
            position,
            justification: justification.into(),
            priority,
            requested_at: Utc::now(),
            requested_by: requested_by.into(),
            metadata: HashMap::new(),
        }
    }
}

// ============================================================================
// BIRTH QUEUE
// ============================================================================

/// Priority-ordered component creation with resource gating.
#[derive(Debug)]
pub struct BirthQueue {
    registry: Arc<ComponentRegistry>,
    config: RwLock<ResourceConfig>,
    pending: RwLock<Vec<BirthRequest>>,
}

impl BirthQueue {
    /// Create a queue over the shared registry
    pub fn new(registry: Arc<ComponentRegistry>, config: ResourceConfig) -> Self {
        Self {
            registry,
            config: RwLock::new(config),
            pending: RwLock::new(Vec::new()),
        }
    }

    /// Swap the resource configuration; applies to subsequent processing
    pub fn set_config(&self, config: ResourceConfig) {
        *self.config.write() = config;
    }

    /// Submit a request for later processing. Returns the request id.
    pub fn submit(&self, request: BirthRequest) -> String {
        let id = request.request_id.clone();
        tracing::debug!(
            request_id = %id,
            priority = %request.priority,
            component_type = %request.component_type,
            "birth request queued"
        );
        self.pending.write().push(request);
        id
    }

    /// Convenience: build and submit a request
    pub fn request(
        &self,
        component_type: ComponentType,
        position: Position3D,
        justification: impl Into<String>,
        priority: BirthPriority,
        requested_by: impl Into<String>,
    ) -> String {
        self.submit(BirthRequest::new(
            component_type,
            position,
            justification,
            priority,
            requested_by,
        ))
    }

    /// Evaluate pending requests and create components for those admitted.
    ///
    /// Requests are considered priority-first, newest-first within a
    /// priority, so urgent work is admitted before older routine work can
    /// consume the remaining budget. Bypass-eligible requests are admitted
    /// unconditionally when the bypass is enabled; everything else passes
    /// through the registry's atomic capacity check. Rejected requests
    /// remain queued.
    pub fn process(&self) -> Vec<ComponentRecord> {
        let config = self.config.read().clone();
        let mut queue: Vec<BirthRequest> = {
            let mut pending = self.pending.write();
            std::mem::take(&mut *pending)
        };
        // Stable sort: priority descending, then newest first
        queue.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.requested_at.cmp(&a.requested_at))
        });

        let mut created = Vec::new();
        let mut retained = Vec::new();

        for request in queue {
            let bypass = config.high_priority_bypass && request.priority.is_bypass_eligible();
            let mut record = ComponentRecord::new(
                uuid::Uuid::new_v4().to_string(),
                request.component_type,
                request.position,
            );
            record.metadata = request.metadata.clone();

            let admitted: Result<()> = if bypass {
                self.registry.register(record.clone())
            } else {
                self.registry
                    .register_bounded(record.clone(), config.max_components)
            };

            match admitted {
                Ok(()) => {
                    tracing::debug!(
                        request_id = %request.request_id,
                        component_id = %record.id,
                        bypass,
                        "birth admitted"
                    );
                    created.push(record);
                }
                Err(err) => {
                    tracing::debug!(
                        request_id = %request.request_id,
                        error = %err,
                        "birth rejected, request retained"
                    );
                    retained.push(request);
                }
            }
        }

        if !retained.is_empty() {
            let mut pending = self.pending.write();
            // Requests submitted while processing ran stay ahead of the
            // re-queued rejects only by priority, which process() restores
            // on its next pass.
            retained.append(&mut pending);
            *pending = retained;
        }
        created
    }

    /// Snapshot of pending requests
    pub fn pending(&self) -> Vec<BirthRequest> {
        self.pending.read().clone()
    }

    /// Number of pending requests
    pub fn pending_count(&self) -> usize {
        self.pending.read().len()
    }
}
