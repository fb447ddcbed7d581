use crate::core::params::identity::wildcard_count;
use crate::core::params::{
    AngleParam, AtomTypeParam, BondParam, ImproperParam, LennardJones, MASS_PLACEHOLDER,
    Parameter, TorsionParam, format_comment,
};
use crate::core::store::ParameterStore;
use std::cmp::Reverse;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Explicit subset of records to write. A `None` class is written in full from the store.
///
/// Selecting torsions (or impropers) also suppresses the store's generic torsions (or
/// impropers); include them in the selection to have them written.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    pub atom_types: Option<Vec<&'a AtomTypeParam>>,
    pub bonds: Option<Vec<&'a BondParam>>,
    pub angles: Option<Vec<&'a AngleParam>>,
    pub torsions: Option<Vec<&'a TorsionParam>>,
    pub impropers: Option<Vec<&'a ImproperParam>>,
}

/// Renders a [`ParameterStore`] in the Q `.prm` layout.
pub struct PrmWriter<'a> {
    store: &'a ParameterStore,
    selection: Selection<'a>,
}

impl<'a> PrmWriter<'a> {
    pub fn new(store: &'a ParameterStore) -> Self {
        Self {
            store,
            selection: Selection::default(),
        }
    }

    pub fn with_selection(mut self, selection: Selection<'a>) -> Self {
        self.selection = selection;
        self
    }

    pub fn render(&self) -> String {
        format!(
            "[options]\n{}\n\n[atom_types]\n{}\n\n[bonds]\n{}\n\n[angles]\n{}\n\n[torsions]\n{}\n\n[impropers]\n{}\n",
            self.options_section(),
            self.atom_types_section(),
            self.bonds_section(),
            self.angles_section(),
            self.torsions_section(),
            self.impropers_section(),
        )
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writer.write_all(self.render().as_bytes())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()
    }

    fn options_section(&self) -> String {
        self.store
            .options()
            .iter()
            .map(|(key, value)| format!("{:<30} {}", key, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn atom_types_section(&self) -> String {
        let vdw14 = self.store.ff_type().scaling_14().vdw;
        let records = pick(&self.selection.atom_types, || {
            self.store.atom_types().values().collect()
        });
        by_identity(records)
            .into_iter()
            .map(|atom| {
                let values = match atom.lj {
                    LennardJones::Arithmetic { r_min, epsilon } => {
                        [r_min, 0.0, epsilon, r_min, epsilon * vdw14]
                    }
                    LennardJones::Geometric { a, b } => {
                        let (a, b) = (round4(a), round4(b));
                        [a, a, b, round4(a * vdw14), round4(b * vdw14)]
                    }
                };
                let mass = match atom.mass {
                    Some(mass) => format!("{:.3}", mass),
                    None => MASS_PLACEHOLDER.to_string(),
                };
                format!(
                    "{:<12} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10}{}",
                    atom.name(),
                    values[0],
                    values[1],
                    values[2],
                    values[3],
                    values[4],
                    mass,
                    format_comment(atom.comment())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn bonds_section(&self) -> String {
        let records = pick(&self.selection.bonds, || self.store.bonds().values().collect());
        by_identity(records)
            .into_iter()
            .map(|bond| {
                let [a, b] = bond.atom_types();
                format!(
                    "{:<12} {:<12} {:>10.3} {:>10.4}{}",
                    a,
                    b,
                    bond.force_constant,
                    bond.r0,
                    format_comment(bond.comment())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn angles_section(&self) -> String {
        let records = pick(&self.selection.angles, || self.store.angles().values().collect());
        by_identity(records)
            .into_iter()
            .map(|angle| {
                let [a, b, c] = angle.atom_types();
                format!(
                    "{:<12} {:<12} {:<12} {:>10.3} {:>10.3}{}",
                    a,
                    b,
                    c,
                    angle.force_constant,
                    angle.theta0,
                    format_comment(angle.comment())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn torsions_section(&self) -> String {
        let ordered = match &self.selection.torsions {
            Some(selected) => by_identity(selected.clone()),
            None => {
                let mut ordered = generics_first(self.store.generic_torsions().values().collect());
                ordered.extend(by_identity(self.store.torsions().values().collect()));
                ordered
            }
        };

        let mut lines = Vec::new();
        for torsion in ordered {
            let [a, b, c, d] = torsion.atom_types();
            let comment = format_comment(torsion.comment());
            for term in torsion.terms() {
                lines.push(format!(
                    "{:<12} {:<12} {:<12} {:<12} {:>10.4} {:>5.1} {:>10.3} {:>5.1}{}",
                    a,
                    b,
                    c,
                    d,
                    term.force_constant,
                    term.multiplicity,
                    term.phase,
                    term.paths,
                    comment
                ));
            }
        }
        lines.join("\n")
    }

    fn impropers_section(&self) -> String {
        let ordered = match &self.selection.impropers {
            Some(selected) => by_identity(selected.clone()),
            None => {
                let mut ordered =
                    generics_first(self.store.generic_impropers().values().collect());
                ordered.extend(by_identity(self.store.impropers().values().collect()));
                ordered
            }
        };

        ordered
            .into_iter()
            .map(|improper| {
                let [a, b, c, d] = improper.atom_types();
                format!(
                    "{:<12} {:<12} {:<12} {:<12} {:>10.4} {:>10.3}{}",
                    a,
                    b,
                    c,
                    d,
                    improper.force_constant,
                    improper.phi0,
                    format_comment(improper.comment())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn pick<'a, T>(selected: &Option<Vec<&'a T>>, all: impl FnOnce() -> Vec<&'a T>) -> Vec<&'a T> {
    match selected {
        Some(records) => records.clone(),
        None => all(),
    }
}

/// Sorts by identity and drops repeated identities.
fn by_identity<T: Parameter>(mut records: Vec<&T>) -> Vec<&T> {
    records.sort_by(|a, b| a.identity().cmp(b.identity()));
    records.dedup_by(|a, b| a.identity() == b.identity());
    records
}

/// Most wildcards first, then by identity.
fn generics_first<T: Parameter>(mut records: Vec<&T>) -> Vec<&T> {
    records.sort_by_key(|r| (Reverse(wildcard_count(r.identity())), r.identity().to_string()));
    records
}

fn round4(value: f64) -> f64 {
    (value * 1e4).round() / 1e4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::ForceFieldType;
    use crate::core::io::native::NativeFile;
    use crate::core::io::traits::{ParameterFormat, ReadContext};
    use crate::core::params::{FourierTerm, ParamRecord};
    use crate::core::policy::ErrorPolicy;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn merge_all(store: &mut ParameterStore, records: Vec<ParamRecord>) {
        for record in records {
            store.merge(record, ErrorPolicy::Strict).unwrap();
        }
    }

    fn torsion(atom_types: [&str; 4], terms: &[(f64, f64, f64)]) -> TorsionParam {
        let mut torsion = TorsionParam::new(atom_types);
        for &(fc, n, phase) in terms {
            torsion.add_term(FourierTerm::new(fc, n, phase, 1.0)).unwrap();
        }
        torsion
    }

    fn amber_store() -> ParameterStore {
        let mut store = ParameterStore::new(ForceFieldType::Amber);
        store.set_option("name", "test_ff");
        store.set_option("vdw_rule", "arithmetic");
        merge_all(
            &mut store,
            vec![
                AtomTypeParam::new(
                    "HC",
                    1.008,
                    LennardJones::Arithmetic {
                        r_min: 1.487,
                        epsilon: 0.0157,
                    },
                )
                .into(),
                AtomTypeParam::new(
                    "CT",
                    12.01,
                    LennardJones::Arithmetic {
                        r_min: 1.908,
                        epsilon: 0.1094,
                    },
                )
                .with_comment("sp3 carbon")
                .into(),
                BondParam::new(["HC", "CT"], 680.0, 1.09).into(),
                AngleParam::new(["HC", "CT", "HC"], 70.0, 109.5).into(),
                torsion(["HC", "CT", "CT", "HC"], &[(0.15, 3.0, 0.0)]).into(),
                torsion(["CA", "CB", "CG", "OG1"], &[(0.25, 2.0, 180.0), (0.144, 1.0, 0.0)]).into(),
                torsion(["?", "CT", "CT", "?"], &[(0.156, 3.0, 0.0)]).into(),
                torsion(["?", "?", "CT", "OS"], &[(0.1, 3.0, 0.0)]).into(),
                ImproperParam::new("C", ["O", "N", "CT"], 10.5, 180.0, 2.0)
                    .unwrap()
                    .into(),
                ImproperParam::new("C", ["O", "?", "?"], 10.5, 180.0, 2.0)
                    .unwrap()
                    .into(),
            ],
        );
        store
    }

    #[test]
    fn renders_sections_in_fixed_order() {
        let output = PrmWriter::new(&amber_store()).render();
        let headers: Vec<&str> = output.lines().filter(|l| l.starts_with('[')).collect();
        assert_eq!(
            headers,
            vec![
                "[options]",
                "[atom_types]",
                "[bonds]",
                "[angles]",
                "[torsions]",
                "[impropers]"
            ]
        );
        assert!(output.contains("\n\n[atom_types]\n"));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn options_are_padded_to_thirty_columns() {
        let output = PrmWriter::new(&amber_store()).render();
        assert!(output.contains(&format!("{:<30} test_ff\n", "name")));
    }

    #[test]
    fn amber_atom_line_uses_arithmetic_layout() {
        let output = PrmWriter::new(&amber_store()).render();
        let line = output.lines().find(|l| l.starts_with("CT ")).unwrap();
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(
            &fields[..7],
            &["CT", "1.9080", "0.0000", "0.1094", "1.9080", "0.0547", "12.010"]
        );
        assert!(line.ends_with(" # sp3 carbon"));
    }

    #[test]
    fn oplsaa_atom_line_uses_geometric_layout() {
        let mut store = ParameterStore::new(ForceFieldType::OplsAa);
        let atom = AtomTypeParam::new("asp.CA", 12.011, LennardJones::Geometric { a: 1000.0, b: 20.0 });
        store.merge(atom.into(), ErrorPolicy::Strict).unwrap();

        let output = PrmWriter::new(&store).render();
        let line = output.lines().find(|l| l.starts_with("asp.CA")).unwrap();
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(
            fields,
            vec!["asp.CA", "1000.0000", "1000.0000", "20.0000", "707.1068", "14.1421", "12.011"]
        );
    }

    #[test]
    fn oplsaa_scaled_columns_are_computed_from_rounded_values() {
        let mut store = ParameterStore::new(ForceFieldType::OplsAa);
        let atom = AtomTypeParam::new(
            "lig.C1",
            12.011,
            LennardJones::Geometric {
                a: 1000.00277,
                b: 20.0,
            },
        );
        store.merge(atom.into(), ErrorPolicy::Strict).unwrap();

        let output = PrmWriter::new(&store).render();
        let line = output.lines().find(|l| l.starts_with("lig.C1")).unwrap();
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(fields[1], "1000.0028");
        assert_eq!(fields[4], "707.1088");
    }

    #[test]
    fn unknown_mass_is_written_as_placeholder() {
        let mut store = ParameterStore::new(ForceFieldType::OplsAa);
        let lj = LennardJones::Geometric { a: 1.0, b: 1.0 };
        store
            .merge(
                AtomTypeParam::with_unknown_mass("zn.ZN1", lj).into(),
                ErrorPolicy::Strict,
            )
            .unwrap();

        let output = PrmWriter::new(&store).render();
        let line = output.lines().find(|l| l.starts_with("zn.ZN1")).unwrap();
        assert!(line.ends_with(&format!(" {:>10}", MASS_PLACEHOLDER)));
    }

    /// The atom-type columns of every line in `section`.
    fn section_ids(output: &str, section: &str, columns: usize) -> Vec<String> {
        output
            .split(&format!("[{}]\n", section))
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .unwrap_or_default()
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .take(columns)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    #[test]
    fn generic_torsions_come_first_with_most_wildcards_leading() {
        let output = PrmWriter::new(&amber_store()).render();
        assert_eq!(
            section_ids(&output, "torsions", 4),
            vec![
                "? ? CT OS",
                "? CT CT ?",
                "CA CB CG OG1",
                "CA CB CG OG1",
                "HC CT CT HC"
            ]
        );
        assert_eq!(
            section_ids(&output, "impropers", 4),
            vec!["? C O ?", "CT C N O"]
        );
    }

    #[test]
    fn selection_replaces_the_store_content_and_hides_generics() {
        let store = amber_store();
        let selected = vec![&store.torsions()["HC CT CT HC"]];
        let output = PrmWriter::new(&store)
            .with_selection(Selection {
                torsions: Some(selected),
                bonds: Some(Vec::new()),
                ..Selection::default()
            })
            .render();

        assert_eq!(section_ids(&output, "torsions", 4), vec!["HC CT CT HC"]);
        assert!(section_ids(&output, "bonds", 2).is_empty());
        assert_eq!(section_ids(&output, "angles", 3), vec!["HC CT HC"]);
        assert_eq!(
            section_ids(&output, "impropers", 4),
            vec!["? C O ?", "CT C N O"]
        );
    }

    #[test]
    fn render_then_read_reproduces_the_store() {
        let store = amber_store();
        let output = PrmWriter::new(&store).render();

        let ctx = ReadContext::new(ForceFieldType::Amber, ErrorPolicy::Strict);
        let parsed = NativeFile::read_from(&mut Cursor::new(output), &ctx).unwrap();
        let mut reread = ParameterStore::new(ForceFieldType::Amber);
        for (key, value) in &parsed.options {
            reread.merge_option(key, value, ErrorPolicy::Strict).unwrap();
        }
        merge_all(&mut reread, parsed.into_records());

        assert_eq!(reread.options(), store.options());
        assert_eq!(reread.len(), store.len());
        for (identity, torsion) in store.torsions() {
            assert_eq!(reread.torsions()[identity].value_repr(), torsion.value_repr());
        }
        for (identity, atom) in store.atom_types() {
            assert_eq!(reread.atom_types()[identity].value_repr(), atom.value_repr());
            assert_eq!(reread.atom_types()[identity].comment(), atom.comment());
        }
        assert_eq!(
            reread.generic_impropers()["? C O ?"].value_repr(),
            store.generic_impropers()["? C O ?"].value_repr()
        );
    }

    #[test]
    fn write_to_path_creates_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.prm");
        let store = amber_store();
        PrmWriter::new(&store).write_to_path(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, PrmWriter::new(&store).render());
    }
}
