#![no_main]

use dump2dot::graph::MemoryGraph;
use dump2dot::record::parse_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Single lines go through the parser directly
    let text = String::from_utf8_lossy(data);
    for line in text.lines() {
        let _ = parse_line(line);
    }

    // Whole inputs go through import and attribution; neither may panic
    if let Ok((mut graph, _)) = MemoryGraph::from_reader(data) {
        dump2dot::attribution::attribute(&mut graph);
        dump2dot::critical_path::mark_critical(&mut graph);
    }
});
