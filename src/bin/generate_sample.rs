use std::sync::Arc;

use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One logged BMS sample.
struct Sample {
    battery: &'static str,
    date: NaiveDate,
    time: String,
    soc: i64,
    voltage: f64,
    current: f64,
}

/// Open-circuit voltage of a Li-ion cell, roughly linear in SoC, minus IR drop.
fn cell_voltage(soc: f64, current: f64, rng: &mut SimpleRng) -> f64 {
    let ocv = 3.2 + 1.0 * soc / 100.0;
    let v = ocv - 0.04 * current + rng.gauss(0.0, 0.005);
    (v * 1000.0).round() / 1000.0
}

fn generate(rng: &mut SimpleRng) -> Vec<Sample> {
    let batteries = [("A1", 1.2), ("A2", 0.9), ("B7", 1.6)];
    let first_day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");

    let mut samples = Vec::new();
    for day in 0..7 {
        let date = first_day + Duration::days(day);
        for &(battery, load) in &batteries {
            // Charged overnight, discharged through the working day.
            let mut soc: f64 = 100.0 - rng.next_f64() * 5.0;
            for hour in 8..=18 {
                let current = (load + rng.gauss(0.0, 0.15)).max(0.0);
                let current = (current * 100.0).round() / 100.0;
                samples.push(Sample {
                    battery,
                    date,
                    time: format!("{hour:02}:00"),
                    soc: soc.round() as i64,
                    voltage: cell_voltage(soc, current, rng),
                    current,
                });
                soc = (soc - current * 4.5).max(0.0);
            }
        }
    }
    samples
}

fn write_csv(path: &str, samples: &[Sample]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Battery ID", "Date", "Time", "SoC", "Voltage", "Current"])?;
    for s in samples {
        writer.write_record([
            s.battery.to_string(),
            s.date.format("%Y-%m-%d").to_string(),
            s.time.clone(),
            s.soc.to_string(),
            format!("{:?}", s.voltage),
            format!("{:?}", s.current),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, samples: &[Sample]) {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date");

    let battery_array = StringArray::from(samples.iter().map(|s| s.battery).collect::<Vec<_>>());
    let date_array = Date32Array::from(
        samples
            .iter()
            .map(|s| (s.date - epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    );
    let time_array = StringArray::from(samples.iter().map(|s| s.time.as_str()).collect::<Vec<_>>());
    let soc_array = Int64Array::from(samples.iter().map(|s| s.soc).collect::<Vec<_>>());
    let voltage_array = Float64Array::from(samples.iter().map(|s| s.voltage).collect::<Vec<_>>());
    let current_array = Float64Array::from(samples.iter().map(|s| s.current).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Battery ID", DataType::Utf8, false),
        Field::new("Date", DataType::Date32, false),
        Field::new("Time", DataType::Utf8, false),
        Field::new("SoC", DataType::Int64, false),
        Field::new("Voltage", DataType::Float64, false),
        Field::new("Current", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(battery_array),
            Arc::new(date_array),
            Arc::new(time_array),
            Arc::new(soc_array),
            Arc::new(voltage_array),
            Arc::new(current_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let samples = generate(&mut rng);

    let csv_path = "sample_bms.csv";
    write_csv(csv_path, &samples).expect("Failed to write CSV");

    let parquet_path = "sample_bms.parquet";
    write_parquet(parquet_path, &samples);

    println!(
        "Wrote {} samples for 3 batteries to {csv_path} and {parquet_path}",
        samples.len()
    );
}
