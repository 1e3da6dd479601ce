// Generic Linux sysfs PWM backend, for any chip root
//
// Layout under the chip root (e.g. /sys/class/pwm/pwmchip0):
//   export            write N to create pwmN/
//   pwmN/period       period in ns
//   pwmN/duty_cycle   high time in ns
//   pwmN/enable       1 = output on
//
// Values are written as decimal text followed by a newline.

use std::collections::hash_map::{Entry, HashMap};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::backend::{PwmBackend, PwmError, Result};
use super::mapping::DutyCycle;

pub struct SysfsPwm {
    root: PathBuf,
    // duty_cycle files stay open for the lifetime of the backend
    duty_files: HashMap<u32, File>,
}

impl SysfsPwm {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            duty_files: HashMap::new(),
        }
    }

    fn channel_dir(&self, channel: u32) -> PathBuf {
        self.root.join(format!("pwm{}", channel))
    }

    fn attribute(&self, channel: u32, name: &str) -> PathBuf {
        self.channel_dir(channel).join(name)
    }

    fn open_attribute(path: &Path) -> Result<File> {
        OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|source| PwmError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    fn write_number(file: &mut File, path: &Path, number: u32) -> Result<()> {
        file.write_all(format!("{}\n", number).as_bytes())
            .map_err(|source| PwmError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    fn write_number_to_file(path: &Path, number: u32) -> Result<()> {
        let mut file = Self::open_attribute(path)?;
        Self::write_number(&mut file, path, number)
    }
}

impl PwmBackend for SysfsPwm {
    fn export(&mut self, channel: u32) -> Result<()> {
        if self.channel_dir(channel).exists() {
            debug!("PWM channel {} already exported", channel);
            return Ok(());
        }
        info!("Exporting PWM channel {}", channel);
        Self::write_number_to_file(&self.root.join("export"), channel)
    }

    fn set_period(&mut self, channel: u32, period: u32) -> Result<()> {
        debug!("PWM channel {}: period={}", channel, period);
        Self::write_number_to_file(&self.attribute(channel, "period"), period)
    }

    fn enable(&mut self, channel: u32) -> Result<()> {
        debug!("PWM channel {}: enable", channel);
        Self::write_number_to_file(&self.attribute(channel, "enable"), 1)
    }

    fn write_duty_cycle(&mut self, channel: u32, duty: DutyCycle) -> Result<()> {
        let path = self.attribute(channel, "duty_cycle");
        let file = match self.duty_files.entry(channel) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Self::open_attribute(&path)?),
        };
        Self::write_number(file, &path, duty.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Fake chip root in the temp dir with the given channels pre-exported
    fn fake_chip(name: &str, exported: &[u32]) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "vehicle-link-pwm-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("export"), "").unwrap();
        for &channel in exported {
            let dir = root.join(format!("pwm{}", channel));
            fs::create_dir_all(&dir).unwrap();
            for attr in ["period", "duty_cycle", "enable"] {
                fs::write(dir.join(attr), "").unwrap();
            }
        }
        root
    }

    fn read(root: &Path, rel: &str) -> String {
        fs::read_to_string(root.join(rel)).unwrap()
    }

    #[test]
    fn test_export_skips_existing_channel() {
        let root = fake_chip("export", &[0]);
        let mut pwm = SysfsPwm::new(&root);

        pwm.export(0).unwrap();
        assert_eq!(read(&root, "export"), "");

        pwm.export(1).unwrap();
        assert_eq!(read(&root, "export"), "1\n");

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_attributes_written_as_text() {
        let root = fake_chip("attrs", &[1]);
        let mut pwm = SysfsPwm::new(&root);

        pwm.set_period(1, 50_000_000).unwrap();
        pwm.enable(1).unwrap();
        pwm.write_duty_cycle(1, DutyCycle(1_500_000)).unwrap();
        pwm.write_duty_cycle(1, DutyCycle(2_000_000)).unwrap();

        assert_eq!(read(&root, "pwm1/period"), "50000000\n");
        assert_eq!(read(&root, "pwm1/enable"), "1\n");
        // Same handle, successive writes
        assert_eq!(read(&root, "pwm1/duty_cycle"), "1500000\n2000000\n");

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_missing_attribute_reports_path() {
        let root = fake_chip("missing", &[]);
        let mut pwm = SysfsPwm::new(&root);

        let err = pwm.write_duty_cycle(0, DutyCycle::NEUTRAL).unwrap_err();
        match err {
            PwmError::Io { path, .. } => assert!(path.ends_with("pwm0/duty_cycle")),
            other => panic!("unexpected error: {}", other),
        }

        fs::remove_dir_all(&root).unwrap();
    }
}
