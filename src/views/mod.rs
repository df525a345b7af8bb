//! Headless view models - each one reads the store and runs its own simulation

mod collaboration;
mod dashboard;
mod edge;
mod federated;
mod micro;
mod temporal;

pub use collaboration::{
    Collaboration, CollaborationMetric, EconomicImpact, PartnershipStatus, SectorBenefit, TechnologyTransfer,
    TransferStatus,
};
pub use dashboard::{ComplianceSlice, Dashboard, DashboardSummary, NodePerformance, SystemMode};
pub use edge::{CameraSource, EdgeProcessing, FrameFormat, ProcessingStats, SimulatedCamera, EDGE_DEMO_NODE};
pub use federated::{
    FederatedLearning, LearningRound, NetworkNode, NetworkRole, ParticipantStatus, RoundTimings, Transmission,
};
pub use micro::{MicroDefectDetection, ScanSummary, DEFAULT_MAGNIFICATION, DEFAULT_SENSITIVITY};
pub use temporal::{AnomalyReport, AnomalySeverity, ScaleProfile, ScaleStatus, ScaleSummary, TemporalAnalysis};

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds a view's busy flag for the lifetime of one async run.
///
/// Dropping the guard clears the flag, including when the run is cancelled.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    /// `None` if the flag is already held
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
