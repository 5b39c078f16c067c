use anyhow::Context;
use serde::Serialize;
use veritext::models::AiDetection;
use veritext::services::detection::score_text;
use veritext::services::pdf_text::extract_pdf;

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  cargo run --bin extract_pdf -- <path.pdf> [--score] [--detailed] [--preview <n>] [--out <json_path>]\n\nNotes:\n  - `--score` runs the heuristic detector offline; perplexity is left out because no model is called."
        );
        return Ok(());
    }

    let path = args[1].clone();
    let score = has_flag(&args, "--score");
    let detailed = has_flag(&args, "--detailed");
    let preview_chars: usize = parse_arg_value(&args, "--preview")
        .and_then(|s| s.parse().ok())
        .unwrap_or(300);
    let out_path = parse_arg_value(&args, "--out");

    let bytes = std::fs::read(&path).with_context(|| format!("read file failed: {}", path))?;
    let extracted = extract_pdf(&bytes)?;

    println!("File: {}", path);
    println!("Pages: {}", extracted.page_count);
    println!(
        "Extracted: {} chars, {} words",
        extracted.text.chars().count(),
        extracted.text.split_whitespace().count()
    );
    println!();
    println!("{}", preview(&extracted.text, preview_chars));

    let detection = score.then(|| score_text(&extracted.text, None, detailed));
    if let Some(AiDetection::Scored(ref result)) = detection {
        println!();
        println!(
            "AI probability: {} ({}, {:?} confidence)",
            result.ai_probability,
            result.verdict.as_str(),
            result.confidence
        );
    }

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        struct Output<'a> {
            file: &'a str,
            page_count: usize,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            ai_detection: Option<AiDetection>,
        }

        let out = Output {
            file: &path,
            page_count: extracted.page_count,
            text: &extracted.text,
            ai_detection: detection,
        };

        let json = serde_json::to_string_pretty(&out)?;
        std::fs::write(&out_path, json).with_context(|| format!("write out failed: {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
