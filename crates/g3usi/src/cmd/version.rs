use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("g3usi {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: g3usi");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("G3USI_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("G3USI_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("G3USI_RUSTC_VERSION").unwrap_or("unknown")
    );
    println!(
        "git_hash: {}",
        option_env!("G3USI_GIT_HASH").unwrap_or("unknown")
    );
    println!(
        "features: host={}, async={}, cli=true",
        cfg!(feature = "host"),
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
