//! The configuration surface of the selection kernel.
//!
//! `KernelSettings` is a plain settings record passed by reference; the
//! kernel never mutates it and never loads it from a file or the command
//! line (that stays a concern of the surrounding engine).

use crate::error::KernelFault;

/// Upper bound on the number of children a single node may hold. Comfortably
/// above the largest legal move count reachable in chess (≤ 218).
pub const MAX_CHILDREN: usize = 256;

/// Visit threshold below which a node's estimates are too noisy to use for
/// uncertainty boosting or policy decay.
pub const DEFAULT_MIN_N_ESTIMATE: u32 = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct KernelSettings {
    cpuct: f32,
    cpuct_base: f32,
    cpuct_factor: f32,
    fpu_reduction: f32,
    fpu_reduction_at_root: f32,
    policy_decay_factor: f32,
    policy_decay_exponent: f32,
    frac_weight_use_running_q: f32,
    enable_uncertainty_boosting: bool,
    min_n_estimate: u32,
    checkmate_certainty_propagation_enabled: bool,
    checkmate_fully_collapse: bool,
    flow_dual_selectors: bool,
    virtual_loss: f32,
}

impl Default for KernelSettings {
    fn default() -> Self {
        KernelSettings {
            cpuct: 1.43,
            cpuct_base: 19652.0,
            cpuct_factor: 2.0,
            fpu_reduction: 0.2,
            fpu_reduction_at_root: 0.0,
            policy_decay_factor: 0.0,
            policy_decay_exponent: 0.5,
            frac_weight_use_running_q: 0.0,
            enable_uncertainty_boosting: false,
            min_n_estimate: DEFAULT_MIN_N_ESTIMATE,
            checkmate_certainty_propagation_enabled: false,
            checkmate_fully_collapse: false,
            flow_dual_selectors: false,
            virtual_loss: 1.0,
        }
    }
}

impl KernelSettings {
    pub fn with_cpuct(mut self, cpuct: f32) -> Self {
        self.cpuct = cpuct;
        self
    }

    pub fn with_cpuct_base(mut self, cpuct_base: f32) -> Self {
        self.cpuct_base = cpuct_base;
        self
    }

    pub fn with_cpuct_factor(mut self, cpuct_factor: f32) -> Self {
        self.cpuct_factor = cpuct_factor;
        self
    }

    pub fn with_fpu_reduction(mut self, fpu_reduction: f32) -> Self {
        self.fpu_reduction = fpu_reduction;
        self
    }

    pub fn with_fpu_reduction_at_root(mut self, fpu_reduction_at_root: f32) -> Self {
        self.fpu_reduction_at_root = fpu_reduction_at_root;
        self
    }

    pub fn with_policy_decay(mut self, factor: f32, exponent: f32) -> Self {
        self.policy_decay_factor = factor;
        self.policy_decay_exponent = exponent;
        self
    }

    pub fn with_frac_weight_use_running_q(mut self, frac: f32) -> Self {
        self.frac_weight_use_running_q = frac;
        self
    }

    pub fn with_uncertainty_boosting(mut self, enabled: bool, min_n_estimate: u32) -> Self {
        self.enable_uncertainty_boosting = enabled;
        self.min_n_estimate = min_n_estimate;
        self
    }

    pub fn with_checkmate_certainty_propagation(mut self, enabled: bool, fully_collapse: bool) -> Self {
        self.checkmate_certainty_propagation_enabled = enabled;
        self.checkmate_fully_collapse = fully_collapse;
        self
    }

    pub fn with_dual_selectors(mut self, enabled: bool) -> Self {
        self.flow_dual_selectors = enabled;
        self
    }

    pub fn with_virtual_loss(mut self, virtual_loss: f32) -> Self {
        self.virtual_loss = virtual_loss;
        self
    }

    pub fn cpuct(&self) -> f32 {
        self.cpuct
    }

    pub fn cpuct_base(&self) -> f32 {
        self.cpuct_base
    }

    pub fn cpuct_factor(&self) -> f32 {
        self.cpuct_factor
    }

    pub fn fpu_reduction(&self, is_root: bool) -> f32 {
        if is_root {
            self.fpu_reduction_at_root
        } else {
            self.fpu_reduction
        }
    }

    pub fn policy_decay_factor(&self) -> f32 {
        self.policy_decay_factor
    }

    pub fn policy_decay_exponent(&self) -> f32 {
        self.policy_decay_exponent
    }

    pub fn frac_weight_use_running_q(&self) -> f32 {
        self.frac_weight_use_running_q
    }

    pub fn enable_uncertainty_boosting(&self) -> bool {
        self.enable_uncertainty_boosting
    }

    pub fn min_n_estimate(&self) -> u32 {
        self.min_n_estimate
    }

    pub fn checkmate_certainty_propagation_enabled(&self) -> bool {
        self.checkmate_certainty_propagation_enabled
    }

    pub fn checkmate_fully_collapse(&self) -> bool {
        self.checkmate_fully_collapse
    }

    pub fn flow_dual_selectors(&self) -> bool {
        self.flow_dual_selectors
    }

    pub fn virtual_loss(&self) -> f32 {
        self.virtual_loss
    }

    /// The visit-dependent CPUCT growth term:
    /// `CPUCT + CPUCTFactor * ln((N + CPUCTBase) / CPUCTBase)`.
    pub fn dynamic_cpuct(&self, n_parent: u32) -> f32 {
        self.cpuct
            + self.cpuct_factor * ((n_parent as f32 + self.cpuct_base) / self.cpuct_base).ln()
    }

    /// Checks the fields a caller might set from untrusted input (a tuning
    /// CLI, a loaded config file) rather than the crate's own builders, which
    /// a trusted caller is free to skip. Consumes `self` and hands it back
    /// unchanged on success; the kernel itself never calls this.
    pub fn validated(self) -> Result<Self, KernelFault> {
        if !(self.cpuct_base > 0.0) {
            return Err(KernelFault::SettingOutOfRange {
                field: "CPUCTBase",
                value: self.cpuct_base,
            });
        }
        if !(0.0..=1.0).contains(&self.frac_weight_use_running_q) {
            return Err(KernelFault::SettingOutOfRange {
                field: "FracWeightUseRunningQ",
                value: self.frac_weight_use_running_q,
            });
        }
        if self.virtual_loss < 0.0 {
            return Err(KernelFault::SettingOutOfRange {
                field: "VirtualLoss",
                value: self.virtual_loss,
            });
        }
        Ok(self)
    }
}
