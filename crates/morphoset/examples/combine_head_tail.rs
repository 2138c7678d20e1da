use morphoset::{SubsetCombiner, SubsetsDocument};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <subsets.json> [out.json]", args[0]);
        std::process::exit(2);
    }

    let doc = SubsetsDocument::from_json_file(Path::new(&args[1]))?;
    let combiner = SubsetCombiner::with_config(doc.combine.clone());
    let combined = match &doc.centroid_sizes {
        Some(sizes) => combiner.combine_with_sizes(&doc.subsets, sizes)?,
        None => combiner.combine(&doc.subsets)?,
    };

    let coords = combined.coordinates();
    println!(
        "Combined {} subsets into {} landmarks x {} specimens.",
        combined.subset_names().len(),
        coords.n_landmarks(),
        coords.n_specimens()
    );
    for (i, name) in combined.subset_names().iter().enumerate() {
        let weights = combined.relative_centroid_sizes().column(i);
        println!(
            "  {name}: {} landmarks, mean relative size {:.3}",
            combined.landmark_counts_per_subset()[i],
            weights.mean().unwrap_or(0.0)
        );
    }
    for notice in combined.notices() {
        println!("  note: {notice}");
    }

    if let Some(out_path) = args.get(2) {
        let json = serde_json::to_string_pretty(&combined)?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
