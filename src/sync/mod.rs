pub mod coalescer;
pub mod controller;
pub mod ranker;
pub mod reconcile;
