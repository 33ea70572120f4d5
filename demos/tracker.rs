use rblocks::{Registry, facade, logging::LogConfig};

/// Prints the blocks the shared registry is holding.
fn print_live_blocks(label: &str) {
  facade::with_registry(|registry| {
    println!("[{}] {} live blocks, {} bytes", label, registry.len(), registry.live_bytes());
    for block in registry.blocks() {
      println!("    {} ({} bytes)", block.address, block.size);
    }
  });
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  // RBLOCKS_DEBUG=3 shows every allocator call.
  LogConfig::from_env().init()?;

  // --------------------------------------------------------------------
  // 1) The shared registry: four allocations, one resize, one free.
  //    Three blocks are never freed, so shutdown reports them.
  // --------------------------------------------------------------------
  facade::init()?;

  facade::allocate(256)?;
  let ptr_b = facade::allocate(256)?;
  facade::allocate(256)?;
  let ptr_a = facade::allocate(2048)?;

  let ptr_a = facade::resize(ptr_a, 256)?;
  println!("\n[1] Resized 2048 byte block down to 256 bytes at {}", ptr_a);

  facade::free(ptr_b)?;
  print_live_blocks("1");

  let report = facade::shutdown()?;
  println!("[1] Shutdown: {} allocs, {} frees, {} leaked", report.allocs, report.frees, report.leaked);

  // --------------------------------------------------------------------
  // 2) A private registry owned by this function. The leak is reported
  //    as an error instead of only being logged.
  // --------------------------------------------------------------------
  let mut registry = Registry::default();
  registry.setup()?;
  registry.allocate(16)?;

  match registry.teardown()?.check() {
    Ok(_) => println!("\n[2] Clean teardown"),
    Err(err) => println!("\n[2] {}", err),
  }

  Ok(())
}
