use empty_leg_optimizer::domain::ports::FleetSource;
use empty_leg_optimizer::{LocalStorage, MatchEngine, MatchPipeline, TomlConfig};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

const AIRPORTS_CSV: &str = "icao,name,city,lat,lon
KTEB,Teterboro,Teterboro,40.8501,-74.0608
KBOS,Boston Logan Intl,Boston,42.3656,-71.0096
KHVN,Tweed New Haven,New Haven,41.2637,-72.8868
KBDL,Bradley Intl,Windsor Locks,41.9389,-72.6832
KMIA,Miami Intl,Miami,25.7959,-80.2870
KEWR,Newark Liberty Intl,Newark,40.6925,-74.1687
KLGA,LaGuardia,New York,40.7769,-73.8740
KJFK,John F Kennedy Intl,New York,40.6413,-73.7781
";

const AIRCRAFT_CSV: &str = "id,tail_number,model,current_icao,next_leg_icao,next_leg_time,user_id
3,N99999,King Air 350,KTEB,KXYZ,,owner-1
2,N54321,Citation CJ3,KBOS,KMIA,2025-03-01 14:30:00,owner-2
1,N12345,Phenom 300,KTEB,KBOS,2025-03-01T09:00:00Z,owner-1
";

fn write_fleet(dir: &Path) {
    std::fs::write(dir.join("airports.csv"), AIRPORTS_CSV).unwrap();
    std::fs::write(dir.join("aircraft.csv"), AIRCRAFT_CSV).unwrap();
}

fn config(data_dir: &Path, output_dir: &Path, extra: &str) -> TomlConfig {
    let toml = format!(
        r#"
[source]
type = "csv"
data_dir = "{}"

[load]
output_path = "{}"
output_formats = ["csv", "tsv", "json"]
{}
"#,
        data_dir.display(),
        output_dir.display(),
        extra
    );
    TomlConfig::from_toml_str(&toml).unwrap()
}

#[tokio::test]
async fn test_csv_fleet_to_report_files() -> anyhow::Result<()> {
    let data_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    write_fleet(data_dir.path());

    let config = config(data_dir.path(), output_dir.path(), "");
    let source = config.source.build()?;
    let storage = LocalStorage::new(output_dir.path());
    let engine = MatchEngine::new(MatchPipeline::new(source, storage, config));

    let run = engine.run().await?;

    assert_eq!(run.report.matches.len(), 2);
    assert_eq!(run.report.skipped.len(), 1);
    assert_eq!(run.report.skipped[0].tail_number, "N99999");

    let csv = std::fs::read_to_string(output_dir.path().join("matches.csv"))?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "tail_number,from,to,distance_km,detour_count,detours");
    assert_eq!(lines[1], "N12345,KTEB,KBOS,304.5,5,\"KBDL, KHVN, KLGA +2 more\"");
    assert_eq!(lines[2], "N54321,KBOS,KMIA,2027.8,0,—");
    assert_eq!(lines.len(), 3);

    let tsv = std::fs::read_to_string(output_dir.path().join("matches.tsv"))?;
    assert!(tsv.contains("N12345\tKTEB\tKBOS\t304.5\t5\tKBDL, KHVN, KLGA +2 more"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.path().join("matches.json"))?)?;
    let codes: Vec<&str> = json["matches"][0]["detours"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["KBDL", "KHVN", "KLGA", "KJFK", "KEWR"]);
    assert!(json["skipped"][0]["reason"].as_str().unwrap().contains("KXYZ"));

    Ok(())
}

#[tokio::test]
async fn test_zip_bundle_and_user_filter() -> anyhow::Result<()> {
    let data_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    write_fleet(data_dir.path());

    let mut config = config(
        data_dir.path(),
        output_dir.path(),
        "display_limit = 0\n\n[load.compression]\nenabled = true\nfilename = \"legs.zip\"",
    );
    if let empty_leg_optimizer::SourceSettings::Csv(csv) = &mut config.source {
        csv.user_id = Some("owner-1".to_string());
    }

    let source = config.source.build()?;
    let storage = LocalStorage::new(output_dir.path());
    let engine = MatchEngine::new(MatchPipeline::new(source, storage, config));

    let run = engine.run().await?;
    assert!(run.output_path.ends_with("legs.zip"));
    assert!(!output_dir.path().join("matches.csv").exists());

    let zip_data = std::fs::read(output_dir.path().join("legs.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 3);

    let mut csv = String::new();
    archive.by_name("matches.csv")?.read_to_string(&mut csv)?;
    // owner-1 只有 N12345 能配對；N99999 被略過
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("\"KBDL, KHVN, KLGA, KJFK, KEWR\""));

    Ok(())
}

#[tokio::test]
async fn test_register_then_match_new_aircraft() -> anyhow::Result<()> {
    let data_dir = TempDir::new()?;
    write_fleet(data_dir.path());

    let config = config(data_dir.path(), data_dir.path(), "");
    let source = config.source.build()?;

    let new = empty_leg_optimizer::NewAircraft::new(" n777ab ", "kteb", "KEWR");
    let stored = empty_leg_optimizer::core::registry::register_aircraft(source.as_ref(), new).await?;
    assert_eq!(stored.id, "4");
    assert_eq!(stored.tail_number, "N777AB");

    let unknown = empty_leg_optimizer::NewAircraft::new("N1", "KTEB", "ZZZZ");
    assert!(empty_leg_optimizer::core::registry::register_aircraft(source.as_ref(), unknown)
        .await
        .is_err());

    let aircraft = source.fetch_aircraft().await?;
    let tails: Vec<&str> = aircraft.iter().map(|a| a.tail_number.as_str()).collect();
    assert_eq!(tails, vec!["N12345", "N54321", "N777AB", "N99999"]);

    let storage = LocalStorage::new(data_dir.path());
    let engine = MatchEngine::new(MatchPipeline::new(config.source.build()?, storage, config));
    let run = engine.run().await?;

    let leg = run
        .report
        .matches
        .iter()
        .find(|m| m.tail_number == "N777AB")
        .unwrap();
    let codes: Vec<&str> = leg.detours.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(&codes[..2], &["KLGA", "KJFK"]);
    assert!(!codes.contains(&"KTEB"));
    assert!(!codes.contains(&"KEWR"));

    Ok(())
}
