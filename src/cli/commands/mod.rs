//! Command execution functions for every packaging pipeline.
//!
//! Commands print their own progress; failures are reported here with
//! recovery suggestions and turned into exit code 1.

// Submodules
mod appimage;
mod helpers;
mod inspect;
mod portable;
mod wrap;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

// Import command executors
use appimage::execute_appimage;
use inspect::{execute_extract, execute_inspect};
use portable::execute_portable;
use wrap::execute_wrap;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    // Validate arguments
    if let Err(validation_error) = args.validate() {
        // Create output for validation errors (never quiet)
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Appimage { .. } => execute_appimage(&args, &config).await,
        Command::Portable { .. } => execute_portable(&args, &config).await,
        Command::Wrap { .. } => execute_wrap(&args, &config).await,
        Command::Extract { .. } => execute_extract(&args, &config).await,
        Command::Inspect { .. } => execute_inspect(&args, &config).await,
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            if e.is_postcondition_failure() {
                config.error_println(&format!("Packaging produced no AppImage: {}", e));
            } else {
                config.error_println(&format!(
                    "Command '{}' failed: {}",
                    args.command.name(),
                    e
                ));
            }

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(e.exit_code())
        }
    }
}
