// This file is the module declaration file for the `core` module.
// It declares the submodules contained within `src/core/` and exposes them
// to the rest of the crate.

// `config` module:
// Defines the configuration file (`CleanerConfig`), the `ConfigProvider`
// trait and the `ConfigManager` that loads, saves and validates it.
pub mod config;

// `engine` module:
// `CleanEngine` applies the block remover to files on disk: validation,
// lossy decoding, backups, writing, and batch bookkeeping.
pub mod engine;
