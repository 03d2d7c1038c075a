//! End-to-end shading scenarios
