use super::error::{ParseErrorKind, ReadError};
use super::traits::{ParameterFormat, ParsedParameters, ReadContext};
use super::util::{Location, split_comment};
use crate::core::forcefield::ForceFieldType;
use crate::core::params::identity::torsion_id;
use crate::core::params::{
    AngleParam, AtomTypeParam, BondParam, FourierTerm, ImproperParam, LennardJones,
    MASS_PLACEHOLDER, Parameter, TorsionParam,
};
use std::io::BufRead;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Options,
    AtomTypes,
    Bonds,
    Angles,
    Torsions,
    Impropers,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "options" => Some(Section::Options),
            "atom_types" => Some(Section::AtomTypes),
            "bonds" => Some(Section::Bonds),
            "angles" => Some(Section::Angles),
            "torsions" => Some(Section::Torsions),
            "impropers" => Some(Section::Impropers),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Section::Options => "options",
            Section::AtomTypes => "atom_types",
            Section::Bonds => "bonds",
            Section::Angles => "angles",
            Section::Torsions => "torsions",
            Section::Impropers => "impropers",
        }
    }
}

/// The Q `.prm` format.
///
/// Torsion lines with the same identity are folded into one torsion only when they are
/// adjacent in the file; separated lines become separate records that meet again in the store.
pub struct NativeFile;

impl ParameterFormat for NativeFile {
    const NAME: &'static str = "Q parameter";

    fn read_from(
        reader: &mut impl BufRead,
        ctx: &ReadContext<'_>,
    ) -> Result<ParsedParameters, ReadError> {
        let mut parsed = ParsedParameters::default();
        let mut section: Option<Section> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let (content, comment) = split_comment(&line);
            if content.is_empty() {
                continue;
            }
            if content.starts_with('[') {
                let name = content
                    .split(']')
                    .next()
                    .unwrap_or("")
                    .trim_matches([' ', '['])
                    .to_lowercase();
                let found = Section::from_name(&name)
                    .ok_or(ReadError::UnknownSection {
                        line: line_num,
                        name,
                    })?;
                debug!("Entering section [{}] on line {}", found.name(), line_num);
                section = Some(found);
                continue;
            }

            let Some(section) = section else {
                return Err(Location::new(line_num, "none").error(ParseErrorKind::OutsideSection));
            };
            let at = Location::new(line_num, section.name());
            let fields: Vec<&str> = content.split_whitespace().collect();

            match section {
                Section::Options => {
                    let [key, value] = fields[..] else {
                        return Err(at.error(ParseErrorKind::KeyValueExpected {
                            found: fields.len(),
                        }));
                    };
                    parsed.options.push((key.to_string(), value.to_string()));
                }
                Section::AtomTypes => {
                    at.require_fields(&fields, 7)?;
                    let first = at.parse_float(fields[1], "column 2")?;
                    let second = at.parse_float(fields[3], "column 4")?;
                    let mass = match fields[6] {
                        MASS_PLACEHOLDER => None,
                        value => Some(at.parse_float(value, "column 7")?),
                    };
                    let lj = match ctx.ff_type {
                        ForceFieldType::OplsAa => LennardJones::Geometric {
                            a: first,
                            b: second,
                        },
                        ForceFieldType::Amber => LennardJones::Arithmetic {
                            r_min: first,
                            epsilon: second,
                        },
                    };
                    let atom = match mass {
                        Some(mass) => AtomTypeParam::new(fields[0], mass, lj),
                        None => AtomTypeParam::with_unknown_mass(fields[0], lj),
                    };
                    parsed.atom_types.push(atom.with_comment(comment));
                }
                Section::Bonds => {
                    at.require_fields(&fields, 4)?;
                    let fc = at.parse_float(fields[2], "force constant")?;
                    let r0 = at.parse_float(fields[3], "r0")?;
                    parsed.bonds.push(
                        BondParam::new([fields[0], fields[1]], fc, r0).with_comment(comment),
                    );
                }
                Section::Angles => {
                    at.require_fields(&fields, 5)?;
                    let fc = at.parse_float(fields[3], "force constant")?;
                    let theta0 = at.parse_float(fields[4], "theta0")?;
                    parsed.angles.push(
                        AngleParam::new([fields[0], fields[1], fields[2]], fc, theta0)
                            .with_comment(comment),
                    );
                }
                Section::Torsions => {
                    at.require_fields(&fields, 8)?;
                    let atom_types = [fields[0], fields[1], fields[2], fields[3]];
                    let term = FourierTerm::new(
                        at.parse_float(fields[4], "force constant")?,
                        at.parse_float(fields[5], "multiplicity")?,
                        at.parse_float(fields[6], "phase")?,
                        at.parse_float(fields[7], "paths")?,
                    );

                    let identity = torsion_id(atom_types);
                    let continues_previous = parsed
                        .torsions
                        .last()
                        .is_some_and(|t| t.identity() == identity);
                    if !continues_previous {
                        parsed
                            .torsions
                            .push(TorsionParam::new(atom_types).with_comment(comment));
                    }
                    if let Some(torsion) = parsed.torsions.last_mut() {
                        torsion.add_term(term).map_err(|source| ReadError::Param {
                            line: line_num,
                            section: section.name().to_string(),
                            source,
                        })?;
                    }
                }
                Section::Impropers => {
                    at.require_fields(&fields, 6)?;
                    let fc = at.parse_float(fields[4], "force constant")?;
                    let phi0 = at.parse_float(fields[5], "phi0")?;
                    let improper = ImproperParam::new(
                        fields[1],
                        [fields[0], fields[2], fields[3]],
                        fc,
                        phi0,
                        2.0,
                    )
                    .map_err(|source| ReadError::Param {
                        line: line_num,
                        section: section.name().to_string(),
                        source,
                    })?;
                    parsed.impropers.push(improper.with_comment(comment));
                }
            }
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::ParamError;
    use crate::core::policy::ErrorPolicy;
    use std::io::Cursor;

    fn read(content: &str, ff_type: ForceFieldType) -> Result<ParsedParameters, ReadError> {
        let ctx = ReadContext::new(ff_type, ErrorPolicy::Strict);
        NativeFile::read_from(&mut Cursor::new(content), &ctx)
    }

    const AMBER_PRM: &str = "\
# test parameter set
[options] default values
name                           amber14sb
vdw_rule                       arithmetic

[atom_types]
CT     1.9080   0.0000   0.1094   1.9080   0.0547   12.0100  ! sp3 carbon

[bonds]
CT  HC   680.000   1.0900   # parm99

[angles]
HC  CT  HC   70.000   109.500

[torsions]
HC  CT  CT  HC   0.1500   3.0   0.000   1.0
? CT CT ?   0.1560   3.0   0.000   1.0
CA  CB  CG  OG1   0.1440   1.0   0.000   1.0  # first
CA  CB  CG  OG1   0.2500   2.0   180.000   1.0
OG1 CG  CB  CA   0.3000   3.0   0.000   1.0

[impropers]
O   C   N   CT   10.5000   180.000
O   C   ?   ?    10.5000   180.000
";

    #[test]
    fn mass_placeholder_reads_as_unknown_mass() {
        let content = "[atom_types]\nzn.ZN1 1.0 1.0 2.0 0.7071 1.4142 <FIX>\n";
        let parsed = read(content, ForceFieldType::OplsAa).unwrap();
        assert_eq!(parsed.atom_types[0].mass, None);

        let content = "[atom_types]\nzn.ZN1 1.0 1.0 2.0 0.7071 1.4142 FIX\n";
        let err = read(content, ForceFieldType::OplsAa).unwrap_err();
        assert!(matches!(err, ReadError::Parse { line: 2, .. }));
    }

    #[test]
    fn reads_every_section_of_an_amber_parameter_file() {
        let parsed = read(AMBER_PRM, ForceFieldType::Amber).unwrap();

        assert_eq!(
            parsed.options,
            vec![
                ("name".to_string(), "amber14sb".to_string()),
                ("vdw_rule".to_string(), "arithmetic".to_string())
            ]
        );
        assert_eq!(parsed.atom_types.len(), 1);
        assert_eq!(
            parsed.atom_types[0].lj,
            LennardJones::Arithmetic {
                r_min: 1.908,
                epsilon: 0.1094
            }
        );
        assert_eq!(parsed.atom_types[0].mass, Some(12.01));
        assert_eq!(parsed.atom_types[0].comment(), Some("sp3 carbon"));
        assert_eq!(parsed.bonds[0].identity(), "CT HC");
        assert_eq!(parsed.bonds[0].comment(), Some("parm99"));
        assert_eq!(parsed.angles[0].theta0, 109.5);
        assert_eq!(parsed.impropers.len(), 2);
        assert_eq!(parsed.impropers[0].center(), "C");
        assert_eq!(parsed.impropers[1].identity(), "? C O ?");
    }

    #[test]
    fn adjacent_torsion_lines_are_folded_by_identity() {
        let parsed = read(AMBER_PRM, ForceFieldType::Amber).unwrap();
        // the reversed third line still has the same identity and follows directly
        assert_eq!(parsed.torsions.len(), 3);
        let folded = &parsed.torsions[2];
        assert_eq!(folded.identity(), "CA CB CG OG1");
        assert_eq!(folded.terms().len(), 3);
        assert_eq!(folded.comment(), Some("first"));
        assert!(parsed.torsions[1].is_generic());
    }

    #[test]
    fn separated_torsion_lines_stay_separate_records() {
        let content = "\
[torsions]
HC CT CT HC 0.15 3.0 0.0 1.0
CT CT OS CT 0.38 3.0 0.0 1.0
HC CT CT HC 0.10 1.0 0.0 1.0
";
        let parsed = read(content, ForceFieldType::Amber).unwrap();
        assert_eq!(parsed.torsions.len(), 3);
    }

    #[test]
    fn oplsaa_atom_types_are_geometric() {
        let content = "[atom_types]\nasp.CA 1802.24 0 34.18 1274.36 24.17 12.011\n";
        let parsed = read(content, ForceFieldType::OplsAa).unwrap();
        assert_eq!(
            parsed.atom_types[0].lj,
            LennardJones::Geometric {
                a: 1802.24,
                b: 34.18
            }
        );
    }

    #[test]
    fn section_names_are_case_insensitive() {
        let parsed = read("[ BONDS ]\nCT HC 680.0 1.09\n", ForceFieldType::Amber).unwrap();
        assert_eq!(parsed.bonds.len(), 1);
    }

    #[test]
    fn unknown_section_is_an_error() {
        let err = read("[charges]\nCT 0.1\n", ForceFieldType::Amber).unwrap_err();
        assert!(matches!(
            err,
            ReadError::UnknownSection { line: 1, ref name } if name == "charges"
        ));
    }

    #[test]
    fn data_before_any_section_is_malformed() {
        let err = read("# header\nCT HC 680.0 1.09\n", ForceFieldType::Amber).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Parse {
                line: 2,
                kind: ParseErrorKind::OutsideSection,
                ..
            }
        ));
    }

    #[test]
    fn options_need_exactly_two_tokens() {
        let err = read("[options]\nname my ff\n", ForceFieldType::Amber).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Parse {
                kind: ParseErrorKind::KeyValueExpected { found: 3 },
                ..
            }
        ));
    }

    #[test]
    fn unparsable_number_reports_line_and_section() {
        let err = read("[bonds]\nCT HC abc 1.09\n", ForceFieldType::Amber).unwrap_err();
        match err {
            ReadError::Parse { line, section, .. } => {
                assert_eq!(line, 2);
                assert_eq!(section, "bonds");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_multiplicity_in_adjacent_lines_is_an_error() {
        let content = "[torsions]\nHC CT CT HC 0.15 3.0 0.0 1.0\nHC CT CT HC 0.20 3.0 0.0 1.0\n";
        let err = read(content, ForceFieldType::Amber).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Param {
                line: 3,
                source: ParamError::DuplicateMultiplicity { .. },
                ..
            }
        ));
    }
}
