//! Throughput harness: replay fixed read/insert/delete/update mixes
//! against each map implementation and report millions of operations
//! per second plus wall-clock seconds, with an aggregate row per
//! implementation.

use churnmap::ChurnMap;
use std::hint::black_box;
use std::process;
use std::time::Instant;

const DEFAULT_OPS: u64 = 1_000_000;

struct Mix {
    name: &'static str,
    read: u64,
    insert: u64,
    delete: u64,
    update: u64,
}

impl Mix {
    fn weight(&self) -> u64 {
        self.read + self.insert + self.delete + self.update
    }
}

const MIXES: [Mix; 4] = [
    Mix { name: "RH", read: 98, insert: 1, delete: 1, update: 0 },
    Mix { name: "EX", read: 10, insert: 40, delete: 40, update: 10 },
    Mix { name: "EXH", read: 1, insert: 98, delete: 98, update: 1 },
    Mix { name: "RG", read: 5, insert: 80, delete: 5, update: 10 },
];

// xorshift64: deterministic per run, cheap enough to disappear next to
// the map operations it drives. Seed must be nonzero.
fn xorshift(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        Some(s)
    })
}

/// The operation surface the mixes exercise, implemented by each
/// contestant.
trait Workbench {
    const NAME: &'static str;
    fn fresh() -> Self;
    fn read(&self, key: u64) -> bool;
    fn insert(&mut self, key: u64, value: u64);
    fn delete(&mut self, key: u64) -> bool;
    fn update(&mut self, key: u64, value: u64) -> bool;
}

impl Workbench for ChurnMap<u64, u64> {
    const NAME: &'static str = "churnmap";
    fn fresh() -> Self {
        ChurnMap::new()
    }
    fn read(&self, key: u64) -> bool {
        self.get(&key).is_some()
    }
    fn insert(&mut self, key: u64, value: u64) {
        self.put(key, value).expect("capacity ladder exhausted");
    }
    fn delete(&mut self, key: u64) -> bool {
        self.remove(&key)
    }
    fn update(&mut self, key: u64, value: u64) -> bool {
        ChurnMap::update(self, &key, value)
    }
}

impl Workbench for std::collections::HashMap<u64, u64> {
    const NAME: &'static str = "std";
    fn fresh() -> Self {
        Self::new()
    }
    fn read(&self, key: u64) -> bool {
        self.get(&key).is_some()
    }
    fn insert(&mut self, key: u64, value: u64) {
        self.insert(key, value);
    }
    fn delete(&mut self, key: u64) -> bool {
        self.remove(&key).is_some()
    }
    fn update(&mut self, key: u64, value: u64) -> bool {
        match self.get_mut(&key) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }
}

impl Workbench for hashbrown::HashMap<u64, u64> {
    const NAME: &'static str = "hashbrown";
    fn fresh() -> Self {
        Self::new()
    }
    fn read(&self, key: u64) -> bool {
        self.get(&key).is_some()
    }
    fn insert(&mut self, key: u64, value: u64) {
        self.insert(key, value);
    }
    fn delete(&mut self, key: u64) -> bool {
        self.remove(&key).is_some()
    }
    fn update(&mut self, key: u64, value: u64) -> bool {
        match self.get_mut(&key) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }
}

fn run_mix<M: Workbench>(mix: &Mix, ops: u64) -> f64 {
    let mut m = M::fresh();
    // Working-set mask: keys collide enough for reads and deletes to hit.
    let key_mask = (ops / 2).next_power_of_two().max(1 << 10) - 1;
    let weight = mix.weight();
    let mut rng = xorshift(ops | 0x6b43_a9b5);

    let start = Instant::now();
    for _ in 0..ops {
        let draw = rng.next().expect("generator is infinite");
        let key = (draw >> 20) & key_mask;
        let choice = draw % weight;
        if choice < mix.read {
            black_box(m.read(key));
        } else if choice < mix.read + mix.insert {
            m.insert(key, draw);
        } else if choice < mix.read + mix.insert + mix.delete {
            black_box(m.delete(key));
        } else {
            black_box(m.update(key, draw));
        }
    }
    let secs = start.elapsed().as_secs_f64();
    black_box(&m);
    secs
}

fn report<M: Workbench>(ops: u64) {
    let mut total = 0.0;
    for mix in &MIXES {
        let secs = run_mix::<M>(mix, ops);
        let mops = ops as f64 / secs / 1e6;
        println!(
            "{:<10} {:<4} {:>10.2} {:>10.3}",
            M::NAME,
            mix.name,
            mops,
            secs
        );
        total += secs;
    }
    let aggregate = (ops * MIXES.len() as u64) as f64 / total / 1e6;
    println!(
        "{:<10} {:<4} {:>10.2} {:>10.3}",
        M::NAME,
        "all",
        aggregate,
        total
    );
}

fn print_help() {
    println!("usage: mixbench [N]");
    println!();
    println!("Runs the RH/EX/EXH/RG operation mixes against each map");
    println!("implementation, N operations per mix (default {DEFAULT_OPS}).");
    println!("Underscores inside N are accepted: mixbench 2_000_000");
}

fn parse_ops() -> Result<u64, String> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        return Err("expected at most one argument".to_string());
    }
    match args.get(1).map(String::as_str) {
        None => Ok(DEFAULT_OPS),
        Some("-h") => {
            print_help();
            process::exit(0);
        }
        Some(raw) => {
            let digits: String = raw.chars().filter(|&c| c != '_').collect();
            digits
                .parse::<u64>()
                .map_err(|_| format!("invalid operation count: {raw}"))
        }
    }
}

fn main() {
    let ops = match parse_ops() {
        Ok(ops) => ops,
        Err(msg) => {
            eprintln!("mixbench: {msg}");
            eprintln!("try: mixbench -h");
            process::exit(2);
        }
    };

    println!("{ops} operations per mix");
    println!(
        "{:<10} {:<4} {:>10} {:>10}",
        "map", "mix", "Mops/s", "secs"
    );
    report::<ChurnMap<u64, u64>>(ops);
    report::<std::collections::HashMap<u64, u64>>(ops);
    report::<hashbrown::HashMap<u64, u64>>(ops);
}
