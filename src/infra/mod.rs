// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several other layers:
//
//   model_store.rs     — Base model loading and fine-tuned model
//                        persistence (full-precision weights,
//                        config, labels, run configuration).
//
//   tokenizer_store.rs — Tokenizer loading, building, saving.
//
//   metrics.rs         — Per-evaluation CSV log and the final
//                        checkpoint leaderboard.
//
//   logging.rs         — tracing subscriber setup.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model directory reading and writing
pub mod model_store;

/// Tokenizer loading, building, and saving
pub mod tokenizer_store;

/// Evaluation metrics CSV and leaderboard
pub mod metrics;

/// Subscriber configuration
pub mod logging;
