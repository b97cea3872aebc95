//! Check command implementation.
//!
//! Validates process table access and configuration.

use chrome_info_exporter::process::{read_comm, read_status_memory, PAGE_SIZE};
use chrome_info_exporter::scanner::TARGET_NAME;
use chrome_info_exporter::{ProcessEntry, ProcessTable};

use crate::config::{validate_effective_config, Config};
use crate::state::TableSource;

/// Validates system requirements and configuration.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Chrome Info Exporter - System Check");
    println!("======================================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📁 Checking process table...");
    match TableSource::from_config(config) {
        Ok(TableSource::Procfs(table)) => {
            let root = table.root().to_path_buf();
            let total = table.processes().count();
            if total == 0 {
                println!("   ❌ Cannot read any process entries from {}", root.display());
                all_ok = false;
            } else {
                println!("   ✅ Can read {} process entries", total);
            }

            println!("\n💾 Checking memory resolution...");
            println!("   Page size: {} bytes", *PAGE_SIZE);
            let own = root.join(std::process::id().to_string());
            match (read_comm(&own), read_status_memory(&own, *PAGE_SIZE)) {
                (Some(name), Some(mem)) => println!(
                    "   ✅ Own process '{}' resolved: {} anon pages, {} vm pages",
                    name, mem.anon_pages, mem.total_vm_pages
                ),
                _ => println!("   ⚠️  Own process not visible under {}", root.display()),
            }

            report_matches(&table);
        }
        Ok(TableSource::Fixture(table)) => {
            println!(
                "   ✅ Test data loaded: {} processes, page size {}",
                table.processes.len(),
                table.page_size
            );
            report_matches(&table);
        }
        Err(e) => {
            println!("   ❌ {:#}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}

fn report_matches<T: ProcessTable>(table: &T) {
    let matched = table
        .processes()
        .filter(|p| p.name() == TARGET_NAME)
        .count();
    println!("\n🔎 {} processes currently named '{}'", matched, TARGET_NAME);
}
