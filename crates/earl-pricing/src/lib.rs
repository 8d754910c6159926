//! earl-pricing — cost of a capacity series under each billing mode.
//!
//! Provisioned capacity is billed per hour at the highest capacity held
//! during that hour. On-demand capacity is billed per million units
//! actually consumed.

pub mod cost;

pub use cost::{
    BillingMode, CostComparison, compare, on_demand_cost, on_demand_cost_for_points,
    provisioned_cost,
};
