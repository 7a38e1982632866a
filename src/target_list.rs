use crate::device::{Connection, Probe, VendorTag};
use crate::snmp::Exchange;
use anyhow::{bail, Result};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::error;

#[derive(Debug)]
pub struct TargetList {
    pub targets: Vec<Connection>,
}

/// Outcome of polling one device.
#[derive(Debug)]
pub struct CpuReading {
    pub connection: Connection,
    pub vendor: VendorTag,
    pub cpu: i64,
}

impl TargetList {
    pub fn from_csv(filename: &str) -> Result<Self> {
        // Check that the file exists
        let path = Path::new(filename);
        if !path.exists() {
            bail!("File {} does not exist", filename);
        }

        let reader = ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: std::io::Read>(reader: csv::Reader<R>) -> Result<Self> {
        let mut targets = Vec::new();
        for line in reader.into_records() {
            let line = line?;
            let target: Connection = line.deserialize(None)?;
            targets.push(target);
        }

        Ok(Self { targets })
    }

    /// Polls every target one after another. Failed devices are logged and
    /// left out of the result.
    pub async fn poll_all<E: Exchange>(&self, probe: &Probe<E>) -> Vec<CpuReading> {
        let mut results = Vec::new();
        for connection in self.targets.iter() {
            match probe.poll(connection).await {
                Ok((tag, cpu)) => results.push(CpuReading {
                    connection: connection.clone(),
                    vendor: tag,
                    cpu,
                }),
                Err(e) => error!("{}: {e}", connection.snmp_address),
            }
        }
        results
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(raw: &str) -> TargetList {
        let reader = ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(raw.as_bytes());
        TargetList::from_reader(reader).unwrap()
    }

    #[test]
    fn reads_targets_skipping_comments() {
        let list = parse(
            "ip_address,community\n# core\n10.0.0.1, public\n10.0.0.2,s3cret\n",
        );
        assert_eq!(
            list.targets,
            vec![
                Connection::new("10.0.0.1", "public"),
                Connection::new("10.0.0.2", "s3cret"),
            ]
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(TargetList::from_csv("/nonexistent/cpu_targets.csv").is_err());
    }
}
