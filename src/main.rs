// ============================================
// Demo - Один сценарий жизненного цикла мира
// ============================================
// blockdata-demo [config.json] [host_dir]
// Логи: RUST_LOG=debug

use std::env;
use std::path::PathBuf;

use blockdata::{BlockPos, BlockValue, DataConfig, DestroyCause, StoreResult, WorldLifecycle};

const WORLD: &str = "world";

fn main() {
    env_logger::init();

    let mut args = env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "blockdata.json".to_string());
    let host_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let config = match DataConfig::load_from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut lifecycle = WorldLifecycle::new(&config, host_dir);
    lifecycle.world_loaded(WORLD);

    if let Err(e) = run(&mut lifecycle) {
        log::error!("Demo failed: {}", e);
    }

    lifecycle.owner_shutting_down();
}

fn run(lifecycle: &mut WorldLifecycle) -> StoreResult<()> {
    lifecycle.chunk_loaded(WORLD, 0, 0);

    let claim = BlockValue::map().with("owner", "alice").with("level", 3);
    let registry = lifecycle.registry_mut();
    registry.set(WORLD, 0, 64, 0, claim)?;
    registry.set(WORLD, 1, 64, 0, 42)?;
    registry.set(WORLD, 2, 64, 0, "hello")?;

    for x in 0..3 {
        match registry.get(WORLD, x, 64, 0)? {
            Some(value) => log::info!("({}, 64, 0) = {}", x, value),
            None => log::info!("({}, 64, 0) is empty", x),
        }
    }

    lifecycle.block_destroyed(WORLD, BlockPos::new(2, 64, 0), DestroyCause::Break);
    lifecycle.world_save_requested(WORLD, true);
    lifecycle.chunk_unloaded(WORLD, 0, 0);

    let registry = lifecycle.registry_mut();
    log::info!("After unload: has (0, 64, 0) = {}", registry.has(WORLD, 0, 64, 0)?);
    if let Some(stats) = registry.stats(WORLD) {
        log::info!("Stats: {:?}", stats);
    }
    Ok(())
}
