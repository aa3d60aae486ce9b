pub mod composite_metrics;
pub mod signal_level;
// Composite indicators are built from readings the backend already computed:
// COS weighs each oscillator against its overbought line,
// BSI measures how far each one has moved from neutral towards that line.
