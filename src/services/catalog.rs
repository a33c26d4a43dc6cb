//! Phase catalog: the compile-time registry of built-in phases.
//!
//! Plugin phases without dynamic loading: the catalog is a table of
//! runner references with deterministic ordering weights. Script phases
//! discovered on disk are layered on top by the plan builder.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::models::{
    normalize_phase_name, PhaseDefinition, PhaseDescriptor, PhaseSource,
};
use crate::domain::ports::PhaseRunner;
use crate::services::runners::{DependenciesRunner, ScriptDelegateRunner, StructureRunner};

/// Global default per-phase timeout when no other budget applies.
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_secs(300);

/// Registration entry for the catalog. Missing fields are defaulted at
/// registration time.
pub struct PhaseSpec {
    pub name: String,
    pub runner: Arc<dyn PhaseRunner>,
    /// Zero means "use the catalog's default timeout".
    pub default_timeout: Duration,
    /// When None, a weight is assigned in insertion order.
    pub weight: Option<u32>,
    pub optional: bool,
    pub description: String,
    pub source: PhaseSource,
}

impl PhaseSpec {
    pub fn native(
        name: impl Into<String>,
        runner: Arc<dyn PhaseRunner>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            runner,
            default_timeout: Duration::ZERO,
            weight: None,
            optional: false,
            description: description.into(),
            source: PhaseSource::Native,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Registry of phase definitions, stably ordered by weight then name.
pub struct PhaseCatalog {
    phases: Vec<PhaseDefinition>,
    default_timeout: Duration,
    next_weight: u32,
}

impl PhaseCatalog {
    pub fn new(default_timeout: Duration) -> Self {
        let default_timeout = if default_timeout.is_zero() {
            DEFAULT_PHASE_TIMEOUT
        } else {
            default_timeout
        };
        Self {
            phases: Vec::new(),
            default_timeout,
            next_weight: 0,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Register a phase. Re-registering the same name overwrites the
    /// previous entry.
    pub fn register(&mut self, spec: PhaseSpec) {
        let name = normalize_phase_name(&spec.name);
        let weight = spec.weight.unwrap_or(self.next_weight);
        self.next_weight = self.next_weight.max(weight.saturating_add(10));
        let timeout = if spec.default_timeout.is_zero() {
            self.default_timeout
        } else {
            spec.default_timeout
        };
        let definition = PhaseDefinition {
            name: name.clone(),
            runner: spec.runner,
            timeout,
            weight,
            optional: spec.optional,
            description: spec.description,
            source: spec.source,
        };
        if let Some(existing) = self.phases.iter_mut().find(|d| d.name == name) {
            *existing = definition;
        } else {
            self.phases.push(definition);
        }
    }

    /// All definitions, stably sorted by weight then name.
    pub fn all(&self) -> Vec<PhaseDefinition> {
        let mut phases = self.phases.clone();
        phases.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.name.cmp(&b.name)));
        phases
    }

    /// Serializable metadata for operator tooling.
    pub fn descriptors(&self) -> Vec<PhaseDescriptor> {
        self.all().iter().map(PhaseDefinition::descriptor).collect()
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, raw_name: &str) -> Option<&PhaseDefinition> {
        let name = normalize_phase_name(raw_name);
        self.phases.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, raw_name: &str) -> bool {
        self.lookup(raw_name).is_some()
    }

    pub fn weight(&self, raw_name: &str) -> Option<u32> {
        self.lookup(raw_name).map(|d| d.weight)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

impl Default for PhaseCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_PHASE_TIMEOUT)
    }
}

/// The built-in validation flow: structure, dependencies, unit,
/// integration, business, and optional performance.
pub fn default_catalog(default_timeout: Duration) -> PhaseCatalog {
    let mut catalog = PhaseCatalog::new(default_timeout);
    catalog.register(
        PhaseSpec::native(
            "structure",
            Arc::new(StructureRunner),
            "Verifies the scenario workspace follows the expected harness layout",
        )
        .with_weight(0),
    );
    catalog.register(
        PhaseSpec::native(
            "dependencies",
            Arc::new(DependenciesRunner),
            "Probes for the host commands the scenario's tests require",
        )
        .with_weight(10),
    );
    catalog.register(
        PhaseSpec::native(
            "unit",
            Arc::new(ScriptDelegateRunner::new("unit")),
            "Runs the scenario's unit test script",
        )
        .with_weight(20),
    );
    catalog.register(
        PhaseSpec::native(
            "integration",
            Arc::new(ScriptDelegateRunner::new("integration")),
            "Runs the scenario's integration test script",
        )
        .with_weight(30),
    );
    catalog.register(
        PhaseSpec::native(
            "business",
            Arc::new(ScriptDelegateRunner::new("business")),
            "Runs the scenario's business validation script",
        )
        .with_weight(40),
    );
    catalog.register(
        PhaseSpec::native(
            "performance",
            Arc::new(ScriptDelegateRunner::new("performance")),
            "Runs the scenario's performance smoke script",
        )
        .with_weight(50)
        .optional(),
    );
    catalog
}
