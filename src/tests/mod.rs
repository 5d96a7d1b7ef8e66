//! Binary-level test suite covering the full briefing pipeline.
