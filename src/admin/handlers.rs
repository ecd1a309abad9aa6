use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::pool::backend_pool::ServerList;
use crate::pool::slot::{SlotSet, SlotStatus};
use crate::sweep::stats::SweepReport;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub period_usec: u64,
    pub ticks: u64,
    pub triggered_total: u64,
    pub last_sweep: Option<SweepReport>,
}

#[derive(Serialize)]
pub struct PoolStatus {
    pub name: String,
    pub servers: Vec<ServerStatus>,
}

#[derive(Serialize)]
pub struct ServerStatus {
    pub name: String,
    pub list: ServerList,
    pub address: String,
    pub slots: Vec<SlotInfo>,
}

#[derive(Serialize)]
pub struct SlotInfo {
    pub index: Option<usize>,
    pub target: String,
    pub state: SlotStatus,
    pub peer: Option<String>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        period_usec: state.period.borrow().as_micros(),
        ticks: state.stats.ticks(),
        triggered_total: state.stats.triggered(),
        last_sweep: state.stats.last(),
    })
}

pub async fn get_pools(State(state): State<AdminState>) -> Json<Vec<PoolStatus>> {
    let pools = state
        .registry
        .snapshot()
        .iter()
        .map(|pool| PoolStatus {
            name: pool.name().to_string(),
            servers: ServerList::ALL
                .into_iter()
                .flat_map(|list| {
                    pool.servers(list).into_iter().map(move |server| ServerStatus {
                        name: server.name().to_string(),
                        list,
                        address: server.address().to_string(),
                        slots: server
                            .slots()
                            .iter()
                            .map(|(index, slot)| SlotInfo {
                                index,
                                target: slot.target().to_string(),
                                state: slot.status(),
                                peer: slot.peer().map(|p| p.to_string()),
                            })
                            .collect(),
                    })
                })
                .collect(),
        })
        .collect();

    Json(pools)
}
