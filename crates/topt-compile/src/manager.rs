//! Pass manager for orchestrating the rewrite pipeline.

use tracing::{debug, info, instrument};

use topt_ir::Circuit;

use crate::config::TransformConfig;
use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{CliffordTVerification, ComposePhasePolyBoxes, HadamardGadgetisation};
use crate::property::PropertySet;

/// Manages and executes a sequence of passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Names of the passes in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run all passes on the given circuit.
    #[instrument(skip(self, circuit, properties))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        properties.config.validate()?;
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.len());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, qubits: {}, ops: {}",
            circuit.num_qubits(),
            circuit.len()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard gadgetisation pipeline.
///
/// The pipeline is, in order: an optional Clifford+T check, optional
/// composition into `{h, phasepolybox}`, then Hadamard gadgetisation.
pub struct PassManagerBuilder {
    properties: PropertySet,
    verify: bool,
    compose: bool,
    gadgetise: bool,
}

impl PassManagerBuilder {
    /// Create a builder that only gadgetises.
    pub fn new() -> Self {
        Self {
            properties: PropertySet::new(),
            verify: false,
            compose: false,
            gadgetise: true,
        }
    }

    /// Set the pass configuration.
    #[must_use]
    pub fn with_config(mut self, config: TransformConfig) -> Self {
        self.properties.config = config;
        self
    }

    /// Check Clifford+T angles before anything else runs.
    #[must_use]
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Group CNOT and diagonal gates into boxes before gadgetising.
    #[must_use]
    pub fn with_composition(mut self, enabled: bool) -> Self {
        self.compose = enabled;
        self
    }

    /// Replace internal Hadamards with measurement gadgets.
    #[must_use]
    pub fn with_gadgetisation(mut self, enabled: bool) -> Self {
        self.gadgetise = enabled;
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();
        if self.verify {
            pm.add_pass(CliffordTVerification);
        }
        if self.compose {
            pm.add_pass(ComposePhasePolyBoxes);
        }
        if self.gadgetise {
            pm.add_pass(HadamardGadgetisation);
        }
        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
