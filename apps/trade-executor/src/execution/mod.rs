//! Order execution: single orders, dual-leg entries and position probing.

pub mod dual_leg;
pub mod gateway;
pub mod probe;

pub use dual_leg::{DualLegCoordinator, DualLegRequest, DualLegResult, DualLegStage};
pub use gateway::{
    CloseResult, GatewaySettings, LegOrderRequest, LegOrderResult, OrderGateway, StopsUpdate,
};
pub use probe::{PositionProbe, PositionSummary, ProbeResult, ProbeRoute};
