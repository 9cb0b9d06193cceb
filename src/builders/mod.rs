// This file is the module declaration file for the `builders` module.
// It declares and makes public all the sub-modules within the `src/builders`
// directory. These modules hold the building blocks the engine is made of.

// `blocks` module:
// The block remover itself. It defines `MarkerPair`, `BlockRemover` and the
// free functions `remove_blocks` and `count_blocks`, which pair each start
// marker with the nearest end marker, cut the blocks out and cap the
// resulting blank-line runs. Everything in here is pure string processing.
pub mod blocks;

// `reporter` module:
// Renders the `BatchSummary` of a multi-file run, either as the plain
// "Results Summary" text or as JSON/YAML for scripts.
pub mod reporter;

// `storage` module:
// The `BackupProvider` trait and its implementations, which keep a copy of
// a file's original text before the cleaned version is written over it.
pub mod storage;

// `validator` module:
// Checks a loaded configuration (version, markers, backup suffix) and each
// target file (exists, is a regular file, is writable) before any work is done.
pub mod validator;
