// src/constants.rs

/// The environment variable carrying the accumulated interpreter options.
/// It is appended to across one invocation, never overwritten wholesale.
pub const NODE_OPTIONS_VAR: &str = "NODE_OPTIONS";

/// Forces TypeScript mode on or off when set to exactly "true" or "false".
/// Any other value is ignored by the mode resolver.
pub const EGG_TYPESCRIPT_VAR: &str = "EGG_TYPESCRIPT";

/// Overrides the compiler register hook specifier (e.g. "esbuild-register").
pub const TS_COMPILER_VAR: &str = "TS_COMPILER";

/// Set by JetBrains debuggers; its presence disables the test runner timeout.
pub const JB_DEBUG_FILE_VAR: &str = "JB_DEBUG_FILE";

/// Conventional runtime environment marker, passed through to the child.
pub const NODE_ENV_VAR: &str = "NODE_ENV";

/// The manifest file describing the target application.
pub const PACKAGE_FILENAME: &str = "package.json";

/// Its presence in the target directory implies a TypeScript project.
pub const TSCONFIG_FILENAME: &str = "tsconfig.json";

/// Directory holding installed modules, probed by the module resolver.
pub const NODE_MODULES_DIRNAME: &str = "node_modules";

/// Legacy per-user module directory (`~/.node_modules`), still honored by node.
pub const LEGACY_MODULES_DIRNAME: &str = ".node_modules";

/// Default compiler register hook for classic (CommonJS) targets.
pub const DEFAULT_COMPILER: &str = "ts-node/register";

/// Default loader hook for modern-module (ESM) targets.
pub const DEFAULT_ESM_LOADER: &str = "ts-node/esm";

/// Path-mapping register hook, injected alongside the compiler hook.
pub const PATHS_REGISTER: &str = "tsconfig-paths/register";

/// The declaration generator binary, expected in the target's node_modules/.bin.
pub const DECLARATIONS_BIN: &str = "ets";

/// The mocha entry script launched by the `test` subcommand.
pub const MOCHA_BIN: &str = "mocha/bin/_mocha";

/// Fallback entry module when neither a flag nor the package declares one.
pub const DEFAULT_ENTRY: &str = "index.js";

/// The interpreter used when no explicit node binary is given.
pub const DEFAULT_NODE_BIN: &str = "node";
