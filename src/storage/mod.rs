pub mod historical_points;
