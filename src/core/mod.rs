mod compile;
pub mod end_uses;
pub mod energy_balance;
pub mod month;
pub mod orientation;
pub mod results;
pub mod sim_model;
pub mod units;
pub mod user_model;
pub mod utilization;
