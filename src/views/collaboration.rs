// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Japan-India collaboration - static partnership figures plus live node counts

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::Engine;
use crate::model::Location;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollaborationMetric {
    pub name: &'static str,
    pub japan: f64,
    pub india: f64,
    pub combined: f64,
    pub improvement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Planned,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TechnologyTransfer {
    pub id: &'static str,
    pub from: Location,
    pub to: Location,
    pub technology: &'static str,
    pub impact: &'static str,
    pub status: TransferStatus,
    /// 0..=100
    pub benefit: u8,
}

/// Projected economic impact, millions USD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EconomicImpact {
    pub year: u16,
    pub japan: u32,
    pub india: u32,
    pub combined: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectorBenefit {
    pub name: &'static str,
    /// Percent share
    pub value: u8,
    pub color: &'static str,
}

const fn metric(name: &'static str, japan: f64, india: f64, combined: f64, improvement: f64) -> CollaborationMetric {
    CollaborationMetric { name, japan, india, combined, improvement }
}

pub static COLLABORATION_METRICS: [CollaborationMetric; 5] = [
    metric("Manufacturing Efficiency", 95.2, 87.8, 96.8, 8.4),
    metric("Quality Standards", 99.1, 94.5, 99.3, 4.2),
    metric("Cost Optimization", 78.5, 92.1, 94.7, 16.2),
    metric("Innovation Speed", 88.4, 91.2, 95.6, 7.2),
    metric("Scalability", 85.3, 96.4, 98.1, 12.8),
];

const fn transfer(
    id: &'static str,
    from: Location,
    technology: &'static str,
    impact: &'static str,
    status: TransferStatus,
    benefit: u8,
) -> TechnologyTransfer {
    let to = match from {
        Location::Japan => Location::India,
        _ => Location::Japan,
    };
    TechnologyTransfer { id, from, to, technology, impact, status, benefit }
}

pub static TECHNOLOGY_TRANSFERS: [TechnologyTransfer; 6] = [
    transfer(
        "jp-01",
        Location::Japan,
        "Precision Manufacturing Standards",
        "Improved quality control processes",
        TransferStatus::Completed,
        85,
    ),
    transfer(
        "jp-02",
        Location::Japan,
        "IoT Sensor Integration",
        "Enhanced real-time monitoring",
        TransferStatus::Active,
        72,
    ),
    transfer(
        "jp-03",
        Location::Japan,
        "Lean Manufacturing Processes",
        "Reduced waste and improved efficiency",
        TransferStatus::Active,
        68,
    ),
    transfer(
        "in-01",
        Location::India,
        "AI Model Optimization",
        "Cost-effective edge computing",
        TransferStatus::Completed,
        91,
    ),
    transfer(
        "in-02",
        Location::India,
        "Scalable Cloud Architecture",
        "Improved system scalability",
        TransferStatus::Active,
        76,
    ),
    transfer(
        "in-03",
        Location::India,
        "Multi-language Compliance",
        "Enhanced global deployability",
        TransferStatus::Planned,
        83,
    ),
];

pub static ECONOMIC_IMPACT: [EconomicImpact; 5] = [
    EconomicImpact { year: 2024, japan: 45, india: 32, combined: 89 },
    EconomicImpact { year: 2025, japan: 68, india: 52, combined: 134 },
    EconomicImpact { year: 2026, japan: 89, india: 78, combined: 189 },
    EconomicImpact { year: 2027, japan: 112, india: 105, combined: 256 },
    EconomicImpact { year: 2028, japan: 138, india: 134, combined: 342 },
];

pub static SECTOR_BENEFITS: [SectorBenefit; 4] = [
    SectorBenefit { name: "Automotive", value: 35, color: "#FF6B00" },
    SectorBenefit { name: "Electronics", value: 28, color: "#00E5FF" },
    SectorBenefit { name: "Pharmaceuticals", value: 22, color: "#39FF14" },
    SectorBenefit { name: "Food Processing", value: 15, color: "#FF10F0" },
];

/// Live partnership overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnershipStatus {
    pub japan_active_nodes: usize,
    pub india_active_nodes: usize,
    pub active_transfers: usize,
    pub completed_transfers: usize,
    pub projected_impact_2028: u32,
}

pub struct Collaboration {
    engine: Arc<Engine>,
    selected: usize,
}

impl Collaboration {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine, selected: 0 }
    }

    pub fn metrics(&self) -> &'static [CollaborationMetric] {
        &COLLABORATION_METRICS
    }

    pub fn selected_metric(&self) -> &'static CollaborationMetric {
        &COLLABORATION_METRICS[self.selected]
    }

    /// Select a metric by name; unknown names keep the current selection
    pub fn select_metric(&mut self, name: &str) -> bool {
        match COLLABORATION_METRICS.iter().position(|m| m.name == name) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }

    pub fn best_improvement(&self) -> &'static CollaborationMetric {
        COLLABORATION_METRICS
            .iter()
            .fold(&COLLABORATION_METRICS[0], |best, m| if m.improvement > best.improvement { m } else { best })
    }

    pub fn transfers(&self) -> &'static [TechnologyTransfer] {
        &TECHNOLOGY_TRANSFERS
    }

    pub fn transfers_from(&self, origin: Location) -> impl Iterator<Item = &'static TechnologyTransfer> {
        TECHNOLOGY_TRANSFERS.iter().filter(move |t| t.from == origin)
    }

    pub fn count_with_status(&self, status: TransferStatus) -> usize {
        TECHNOLOGY_TRANSFERS.iter().filter(|t| t.status == status).count()
    }

    pub fn economic_impact(&self) -> &'static [EconomicImpact] {
        &ECONOMIC_IMPACT
    }

    pub fn sector_benefits(&self) -> &'static [SectorBenefit] {
        &SECTOR_BENEFITS
    }

    pub fn status(&self) -> PartnershipStatus {
        let snapshot = self.engine.snapshot();
        PartnershipStatus {
            japan_active_nodes: snapshot.active_nodes_in(Location::Japan),
            india_active_nodes: snapshot.active_nodes_in(Location::India),
            active_transfers: self.count_with_status(TransferStatus::Active),
            completed_transfers: self.count_with_status(TransferStatus::Completed),
            projected_impact_2028: ECONOMIC_IMPACT[ECONOMIC_IMPACT.len() - 1].combined,
        }
    }
}
