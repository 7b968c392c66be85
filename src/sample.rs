use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::{ITEM_SUMMARY_FILE, SPELL_SUMMARY_FILE};

pub const SAMPLE_MASTER_FILE: &str = "champion_master_plus.csv";

const CHAMPION_POOL: [&str; 32] = [
    "Ahri", "Akali", "Amumu", "Annie", "Ashe", "Brand", "Caitlyn", "Darius", "Ezreal", "Fizz",
    "Garen", "Jinx", "Karthus", "Kai'Sa", "Lux", "Malphite", "Miss Fortune", "Morgana", "Nami",
    "Nidalee", "Orianna", "Seraphine", "Sion", "Sona", "Swain", "Teemo", "Veigar", "Vel'Koz",
    "Xerath", "Yasuo", "Ziggs", "Zyra",
];

const RUNES: [&str; 6] = [
    "Electrocute",
    "Arcane Comet",
    "Conqueror",
    "Lethal Tempo",
    "Aery",
    "Dark Harvest",
];

const SPELL_COMBOS: [&str; 8] = [
    "Flash+Mark",
    "Flash+Ghost",
    "Flash+Heal",
    "Flash+Exhaust",
    "Flash+Ignite",
    "Flash+Barrier",
    "Flash+Clarity",
    "Ghost+Mark",
];

const STARTS: [&str; 4] = ["Dark Seal", "Doran's Blade", "Tear", "Guardian's Orb"];

const BOOTS: [&str; 4] = [
    "Sorcerer's Shoes",
    "Berserker's Greaves",
    "Plated Steelcaps",
    "Mercury's Treads",
];

const ITEMS: [&str; 14] = [
    "Luden's Companion",
    "Liandry's Torment",
    "Rabadon's Deathcap",
    "Shadowflame",
    "Infinity Edge",
    "Kraken Slayer",
    "Sunfire Aegis",
    "Thornmail",
    "Sterak's Gage",
    "Trinity Force",
    "Rylai's Crystal Scepter",
    "Zhonya's Hourglass",
    "Void Staff",
    "Heartsteel",
];

const BASE_STAT_COLUMNS: [&str; 14] = [
    "hp",
    "hpperlevel",
    "mp",
    "mpperlevel",
    "armor",
    "armorperlevel",
    "spellblock",
    "spellblockperlevel",
    "attackdamage",
    "attackdamageperlevel",
    "attackspeed",
    "attackspeedperlevel",
    "movespeed",
    "attackrange",
];

#[derive(Debug, Clone)]
pub struct SampleSet {
    pub champions: usize,
    pub master: String,
    pub spell_summary: String,
    pub item_summary: String,
}

impl SampleSet {
    pub fn generate(champions: usize, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let names = champion_names(champions);
        Ok(Self {
            champions: names.len(),
            master: master_csv(&names, &mut rng)?,
            spell_summary: summary_csv("spell_combo", &SPELL_COMBOS, &mut rng)?,
            item_summary: summary_csv("item", &ITEMS, &mut rng)?,
        })
    }

    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        let files = [
            (SAMPLE_MASTER_FILE, &self.master),
            (SPELL_SUMMARY_FILE, &self.spell_summary),
            (ITEM_SUMMARY_FILE, &self.item_summary),
        ];
        let mut written = Vec::with_capacity(files.len());
        for (name, body) in files {
            let path = dir.join(name);
            fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }
}

fn champion_names(count: usize) -> Vec<String> {
    (0..count)
        .map(|idx| {
            let base = CHAMPION_POOL[idx % CHAMPION_POOL.len()];
            let round = idx / CHAMPION_POOL.len();
            if round == 0 {
                base.to_string()
            } else {
                format!("{base} {}", round + 1)
            }
        })
        .collect()
}

fn master_csv(names: &[String], rng: &mut impl Rng) -> Result<String> {
    let mut header = vec![
        "champion",
        "games",
        "wins",
        "winrate",
        "pickrate",
        "kda",
        "avg_dpm",
        "avg_gpm",
        "delta_winrate",
        "best_rune",
        "best_spell_combo",
        "best_start",
        "best_boots",
        "best_core3",
        "synergy_top1",
        "synergy_wr",
        "enemy_hard_top1",
        "enemy_wr",
        "dpm_early",
        "dpm_mid",
        "dpm_late",
    ];
    header.extend(BASE_STAT_COLUMNS);

    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&header)?;

    for name in names {
        let games: u32 = rng.gen_range(150..4000);
        let wins = (games as f64 * rng.gen_range(0.42..0.60)).round() as u32;
        let winrate = wins as f64 / games as f64 * 100.0;
        let dpm: f64 = rng.gen_range(450.0..1400.0);

        let mut record = vec![
            name.clone(),
            games.to_string(),
            wins.to_string(),
            format!("{winrate:.2}"),
            format!("{:.2}", rng.gen_range(0.5..14.0)),
            format!("{:.2}", rng.gen_range(1.4..4.2)),
            format!("{dpm:.1}"),
            format!("{:.1}", rng.gen_range(320.0..470.0)),
            optional_number(rng, 0.7, -3.5..3.5),
            pick(&RUNES, rng),
            pick(&SPELL_COMBOS, rng),
            pick(&STARTS, rng),
            pick(&BOOTS, rng),
            core_build(rng),
        ];
        for _ in 0..2 {
            if rng.gen_bool(0.6) {
                let other = pick_other(names, name, rng);
                record.push(other);
                record.push(format!("{:.2}", rng.gen_range(44.0..62.0)));
            } else {
                record.push(String::new());
                record.push(String::new());
            }
        }
        record.push(format!("{:.1}", dpm * rng.gen_range(0.6..0.85)));
        record.push(format!("{:.1}", dpm * rng.gen_range(0.9..1.1)));
        record.push(format!("{:.1}", dpm * rng.gen_range(1.1..1.4)));
        record.extend(base_stats(rng));

        wtr.write_record(&record)?;
    }

    finish(wtr)
}

fn summary_csv(label: &str, labels: &[&str], rng: &mut impl Rng) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([label, "games", "wins", "winrate"])?;
    for name in labels {
        let games: u32 = rng.gen_range(400..25_000);
        let wins = (games as f64 * rng.gen_range(0.44..0.58)).round() as u32;
        let winrate = wins as f64 / games as f64 * 100.0;
        wtr.write_record([
            name.to_string(),
            games.to_string(),
            wins.to_string(),
            format!("{winrate:.4}"),
        ])?;
    }
    finish(wtr)
}

fn base_stats(rng: &mut impl Rng) -> Vec<String> {
    let ranged = rng.gen_bool(0.5);
    let values = [
        rng.gen_range(530.0..680.0),
        rng.gen_range(88.0..114.0),
        rng.gen_range(0.0..500.0),
        rng.gen_range(0.0..40.0),
        rng.gen_range(18.0..38.0),
        rng.gen_range(3.5..5.2),
        rng.gen_range(28.0..32.0),
        rng.gen_range(1.3..2.1),
        rng.gen_range(50.0..68.0),
        rng.gen_range(2.5..4.5),
        rng.gen_range(0.6..0.7),
        rng.gen_range(1.0..3.5),
        rng.gen_range(325.0..350.0),
        if ranged { rng.gen_range(500.0..650.0) } else { 125.0 },
    ];
    values.iter().map(|v| format!("{v:.3}")).collect()
}

fn optional_number(rng: &mut impl Rng, present: f64, range: std::ops::Range<f64>) -> String {
    if rng.gen_bool(present) {
        format!("{:.2}", rng.gen_range(range))
    } else {
        String::new()
    }
}

fn pick(options: &[&str], rng: &mut impl Rng) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

fn pick_other(names: &[String], current: &str, rng: &mut impl Rng) -> String {
    let others: Vec<&String> = names.iter().filter(|n| n.as_str() != current).collect();
    others
        .choose(rng)
        .map(|n| n.to_string())
        .unwrap_or_default()
}

fn core_build(rng: &mut impl Rng) -> String {
    let picks: Vec<&str> = ITEMS.choose_multiple(rng, 3).copied().collect();
    picks.join(" / ")
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|err| anyhow!("flush csv buffer: {}", err.error()))?;
    String::from_utf8(bytes).context("sample csv is not utf-8")
}

#[cfg(test)]
mod tests {
    use super::{SampleSet, champion_names};

    #[test]
    fn names_stay_unique_past_the_pool() {
        let names = champion_names(70);
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 70);
        assert!(names.contains(&"Ahri 2".to_string()));
    }

    #[test]
    fn same_seed_same_dataset() {
        let a = SampleSet::generate(12, 7).unwrap();
        let b = SampleSet::generate(12, 7).unwrap();
        assert_eq!(a.master, b.master);
        assert_eq!(a.item_summary, b.item_summary);
        assert_eq!(a.master.lines().count(), 13);
    }
}
