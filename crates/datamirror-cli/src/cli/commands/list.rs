//! List command: print registered datasets.

use datamirror_core::Registry;

pub fn run_list(registry: &Registry) {
    for descriptor in registry.iter() {
        println!("{:<20} {}", descriptor.name, descriptor.source_url);
    }
}
