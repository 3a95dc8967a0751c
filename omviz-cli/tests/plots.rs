use std::fs;
use std::path::Path;
use std::process::Command;

fn omviz() -> Command {
    Command::new(env!("CARGO_BIN_EXE_omviz"))
}

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

fn assert_svg(path: &Path) {
    let contents = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("missing output {}", path.display()));
    assert!(contents.contains("<svg"), "not an SVG: {}", path.display());
}

#[test]
fn volcano_subcommand_writes_svg() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("de.csv");
    let out = dir.path().join("volcano.svg");
    write_file(
        &input,
        "symbol,log2FoldChange,pvalue,padj\n\
         G1,4.0,0.001,0.001\n\
         G2,-4.0,0.001,0.001\n\
         G3,0.1,0.5,0.5\n\
         G4,2.0,NA,NA\n",
    );

    let status = omviz()
        .args(["volcano", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .args(["--top-n", "5", "--colors", "up=red,down=blue,ns=grey"])
        .status()
        .unwrap();
    assert!(status.success());
    assert_svg(&out);
}

#[test]
fn volcano_missing_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("de.csv");
    let out = dir.path().join("volcano.svg");
    write_file(&input, "symbol,log2FoldChange,pvalue\nG1,4.0,0.001\n");

    let output = omviz()
        .args(["volcano", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("padj"), "stderr was: {stderr}");
    assert!(!out.exists());
}

#[test]
fn venn_subcommand_from_set_files() {
    let dir = tempfile::tempdir().unwrap();
    let treated = dir.path().join("treated.txt");
    let control = dir.path().join("control.txt");
    let out = dir.path().join("venn.svg");
    write_file(&treated, "TP53\nBRCA1\nMYC\n");
    write_file(&control, "MYC\nEGFR\n");

    let status = omviz()
        .arg("venn")
        .arg("--set")
        .arg(&treated)
        .arg("--set")
        .arg(&control)
        .arg("--out")
        .arg(&out)
        .args(["--percentages", "--theme", "nature"])
        .status()
        .unwrap();
    assert!(status.success());
    assert_svg(&out);
}

#[test]
fn venn_rejects_single_set() {
    let dir = tempfile::tempdir().unwrap();
    let only = dir.path().join("only.txt");
    let out = dir.path().join("venn.svg");
    write_file(&only, "TP53\n");

    let output = omviz()
        .arg("venn")
        .arg("--set")
        .arg(&only)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2 or 3"), "stderr was: {stderr}");
}

#[test]
fn upset_subcommand_writes_svg() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("peaks.csv");
    let out = dir.path().join("upset.svg");
    write_file(
        &input,
        "peak_id,annotation\n\
         peak_1,Promoter (<=1kb)\n\
         peak_1,\"Exon (ENST0001, exon 1 of 3)\"\n\
         peak_2,Distal Intergenic\n\
         peak_3,\"Intron (ENST0002, intron 2 of 10)\"\n\
         peak_4,Promoter (1-2kb)\n",
    );

    let status = omviz()
        .args(["upset", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .args(["--max-combos", "10"])
        .status()
        .unwrap();
    assert!(status.success());
    assert_svg(&out);
}

#[test]
fn unknown_theme_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("de.csv");
    let out = dir.path().join("volcano.svg");
    write_file(&input, "symbol,log2FoldChange,pvalue,padj\nG1,4.0,0.001,0.001\n");

    let output = omviz()
        .args(["volcano", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .args(["--theme", "neon"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown theme"));
}
