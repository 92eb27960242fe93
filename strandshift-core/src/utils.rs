use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use log::warn;

use crate::errors::AnchorParseError;
use crate::models::{ChromosomeReads, ReadAnchor, Strand};

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    let reader = BufReader::new(file);

    Ok(reader)
}

/// Get a reader for either a gzipped, non-gzipped file, or stdin
///
/// # Arguments
///
/// - file_path: path to the file to read, or '-' for stdin
pub fn get_dynamic_reader_w_stdin(file_path_str: &str) -> Result<BufReader<Box<dyn Read>>> {
    if file_path_str == "-" {
        Ok(BufReader::new(Box::new(std::io::stdin()) as Box<dyn Read>))
    } else {
        let file_path = Path::new(file_path_str);
        get_dynamic_reader(file_path)
    }
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

///
/// Read a two column `name<TAB>value` table, keeping the file order.
///
fn read_name_value_table(path: &Path) -> Result<Vec<(String, u64)>> {
    let reader = get_dynamic_reader(path)?;
    let mut rows = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) {
            continue;
        }

        let mut fields = line.split_whitespace();
        let name = fields.next().ok_or(AnchorParseError::MalformedLine {
            line: idx + 1,
            reason: "missing chromosome name".to_string(),
        })?;
        let value = fields
            .next()
            .ok_or(AnchorParseError::MalformedLine {
                line: idx + 1,
                reason: "missing length".to_string(),
            })?
            .parse::<u64>()
            .with_context(|| format!("Failed to parse length on line {}: {}", idx + 1, line))?;

        rows.push((name.to_string(), value));
    }

    Ok(rows)
}

///
/// Read a chromosome sizes file (`chr1<TAB>248956422`).
///
/// The order of the file is kept; it decides the order in which chromosomes
/// are processed and reported.
///
pub fn read_chrom_sizes<T: AsRef<Path>>(path: T) -> Result<Vec<(String, u64)>> {
    let sizes = read_name_value_table(path.as_ref())
        .with_context(|| "Failed to read chrom sizes file.")?;

    if sizes.is_empty() {
        return Err(AnchorParseError::EmptyChromSizes(
            path.as_ref().to_string_lossy().into_owned(),
        )
        .into());
    }

    Ok(sizes)
}

///
/// Read a mappability table: number of mappable base pairs per chromosome.
///
pub fn read_mappability<T: AsRef<Path>>(path: T) -> Result<HashMap<String, u64>> {
    let table = read_name_value_table(path.as_ref())
        .with_context(|| "Failed to read mappability table.")?;
    Ok(table.into_iter().collect())
}

fn parse_duplicate_flag(field: &str) -> Result<bool, AnchorParseError> {
    match field.to_lowercase().as_str() {
        "0" | "false" | "f" | "no" => Ok(false),
        "1" | "true" | "t" | "yes" => Ok(true),
        _ => Err(AnchorParseError::InvalidDuplicateFlag(field.to_string())),
    }
}

///
/// Parse one anchor line: `chrom<TAB>position<TAB>strand[<TAB>duplicate]`.
///
pub fn parse_anchor_line(
    line: &str,
    line_number: usize,
) -> Result<(String, Strand, ReadAnchor), AnchorParseError> {
    let mut fields = line.split('\t');

    let malformed = |reason: &str| AnchorParseError::MalformedLine {
        line: line_number,
        reason: reason.to_string(),
    };

    let chrom = fields.next().ok_or_else(|| malformed("missing chromosome"))?;
    let position = fields
        .next()
        .ok_or_else(|| malformed("missing position"))?
        .trim()
        .parse::<i64>()
        .map_err(|_| malformed("position is not an integer"))?;
    let strand = fields
        .next()
        .ok_or_else(|| malformed("missing strand"))?
        .trim()
        .parse::<Strand>()?;
    let duplicate = match fields.next() {
        Some(flag) if !flag.trim().is_empty() => parse_duplicate_flag(flag.trim())?,
        _ => false,
    };

    Ok((
        chrom.to_string(),
        strand,
        ReadAnchor {
            position,
            duplicate,
        },
    ))
}

///
/// Load read anchors and group them into chromosomes.
///
/// # Arguments
///
/// - anchor_path: anchor file (gzip allowed) or `-` for stdin
/// - chrom_sizes: chromosomes to build, in output order
/// - mappability: optional mappable length per chromosome
///
/// Anchors on chromosomes missing from `chrom_sizes` are skipped with one
/// warning per chromosome name.
///
pub fn read_anchor_file(
    anchor_path: &str,
    chrom_sizes: &[(String, u64)],
    mappability: Option<&HashMap<String, u64>>,
) -> Result<Vec<ChromosomeReads>> {
    let mut chromosomes: Vec<ChromosomeReads> = chrom_sizes
        .iter()
        .map(|(name, length)| {
            let mappable = mappability
                .and_then(|m| m.get(name))
                .copied()
                .unwrap_or(*length);
            ChromosomeReads::new(name.clone(), *length).with_mappable_length(mappable)
        })
        .collect();

    let index: HashMap<String, usize> = chrom_sizes
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.clone(), i))
        .collect();

    let mut unknown: HashSet<String> = HashSet::new();
    let reader = get_dynamic_reader_w_stdin(anchor_path)?;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line) {
            continue;
        }

        let (chrom, strand, anchor) = parse_anchor_line(&line, idx + 1)
            .with_context(|| format!("Failed to parse anchor file: {}", anchor_path))?;

        match index.get(&chrom) {
            Some(&i) => chromosomes[i].push(strand, anchor),
            None => {
                if unknown.insert(chrom.clone()) {
                    warn!("{} is not in the chromosome sizes file, skipping its reads", chrom);
                }
            }
        }
    }

    Ok(chromosomes)
}

/// Strip a leading `chr` from a chromosome name.
pub fn strip_chr_prefix(name: &str) -> &str {
    name.strip_prefix("chr").unwrap_or(name)
}

const YEAST_CHROMOSOMES: [&str; 16] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV", "XV",
    "XVI",
];

const FLY_AUTOSOME_ARMS: [&str; 4] = ["2L", "2R", "3L", "3R"];

///
/// Decide whether a chromosome takes part in the genome-wide estimate.
///
/// Numbered chromosomes (`chr1`, `7`, ...) and the fly autosome arms count;
/// sex chromosomes, mitochondria and unplaced contigs do not. With `yeast`
/// set, roman numbered chromosomes (`chrI` .. `chrXVI`) count as well.
///
pub fn is_autosome(name: &str, yeast: bool) -> bool {
    let name = strip_chr_prefix(name);

    if let Ok(number) = name.parse::<u32>() {
        return number > 0;
    }
    if FLY_AUTOSOME_ARMS.contains(&name) {
        return true;
    }

    yeast && YEAST_CHROMOSOMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[rstest]
    #[case("chr1", false, true)]
    #[case("22", false, true)]
    #[case("chrX", false, false)]
    #[case("chrY", false, false)]
    #[case("chrM", false, false)]
    #[case("chr1_KI270706v1_random", false, false)]
    #[case("chr2L", false, true)]
    #[case("chrIV", false, false)]
    #[case("chrIV", true, true)]
    #[case("chr0", false, false)]
    fn test_is_autosome(#[case] name: &str, #[case] yeast: bool, #[case] expected: bool) {
        assert_eq!(is_autosome(name, yeast), expected);
    }

    #[rstest]
    fn test_read_chrom_sizes_keeps_order() {
        let file = write_temp("# comment\nchr2\t300\n\nchr1\t100\n", ".sizes");
        let sizes = read_chrom_sizes(file.path()).unwrap();
        assert_eq!(
            sizes,
            vec![("chr2".to_string(), 300), ("chr1".to_string(), 100)]
        );
    }

    #[rstest]
    fn test_read_chrom_sizes_rejects_empty_file() {
        let file = write_temp("# nothing here\n", ".sizes");
        assert!(read_chrom_sizes(file.path()).is_err());
    }

    #[rstest]
    fn test_parse_anchor_line() {
        let (chrom, strand, anchor) = parse_anchor_line("chr1\t150\t-\t1", 1).unwrap();
        assert_eq!(chrom, "chr1");
        assert_eq!(strand, Strand::Reverse);
        assert_eq!(anchor, ReadAnchor::duplicate(150));

        let (_, strand, anchor) = parse_anchor_line("chr1\t7\t+", 2).unwrap();
        assert_eq!(strand, Strand::Forward);
        assert_eq!(anchor, ReadAnchor::new(7));
    }

    #[rstest]
    fn test_parse_anchor_line_rejects_bad_position() {
        let result = parse_anchor_line("chr1\tabc\t+", 3);
        assert!(matches!(
            result,
            Err(AnchorParseError::MalformedLine { line: 3, .. })
        ));
    }

    #[rstest]
    fn test_read_anchor_file_groups_by_chromosome() {
        let anchors = write_temp(
            "chr1\t10\t+\nchr1\t30\t-\nchrUn\t5\t+\nchr2\t40\t-\t1\n",
            ".tsv",
        );
        let sizes = vec![("chr1".to_string(), 100), ("chr2".to_string(), 200)];
        let mut mappability = HashMap::new();
        mappability.insert("chr2".to_string(), 150);

        let chroms =
            read_anchor_file(anchors.path().to_str().unwrap(), &sizes, Some(&mappability))
                .unwrap();

        assert_eq!(chroms.len(), 2);
        assert_eq!(chroms[0].forward, vec![ReadAnchor::new(10)]);
        assert_eq!(chroms[0].reverse, vec![ReadAnchor::new(30)]);
        assert_eq!(chroms[0].mappable_length, 100);
        assert_eq!(chroms[1].reverse, vec![ReadAnchor::duplicate(40)]);
        assert_eq!(chroms[1].mappable_length, 150);
        assert_eq!(chroms[1].nonredundant_reads(), 0);
    }

    #[rstest]
    fn test_read_gzipped_anchor_file() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"chr1\t10\t+\nchr1\t12\t+\n").unwrap();
        let bytes = encoder.finish().unwrap();

        let mut file = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
        file.write_all(&bytes).unwrap();

        let sizes = vec![("chr1".to_string(), 100)];
        let chroms = read_anchor_file(file.path().to_str().unwrap(), &sizes, None).unwrap();
        assert_eq!(chroms[0].forward.len(), 2);
    }
}
