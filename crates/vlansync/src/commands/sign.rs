use vlansync_config::Settings;
use vlansync_core::gate::sign;

use super::read_payload;
use crate::cli::SignArgs;
use crate::error::CliError;

pub fn handle(args: &SignArgs, settings: &Settings) -> Result<(), CliError> {
    let secret = settings.signing_secret()?;
    let body = read_payload(&args.payload)?;
    println!("{}", sign(&secret, &body));
    Ok(())
}
