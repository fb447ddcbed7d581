//! Amber `parm` (complete parameter set) and `frcmod` (modification set) files.
//!
//! Both are fixed-column formats sharing the same record layouts:
//!
//! | block     | columns (0-based, end-exclusive)                                            |
//! |-----------|-----------------------------------------------------------------------------|
//! | bond      | `a[0:2] b[3:5] fc[5:15] r0[15:25]`                                          |
//! | angle     | `a[0:2] b[3:5] c[6:8] fc[8:18] theta0[18:28]`                               |
//! | torsion   | `a[0:2] b[3:5] c[6:8] d[9:11] paths[11:15] fc[15:30] phase[30:45] n[45:60]` |
//! | improper  | as torsion, without paths; the center is the third atom                     |
//!
//! Masses and non-bonded parameters are whitespace separated. Amber's harmonic force constants
//! are doubled to match Q's `½·k` convention, `*` in type names becomes `star` and the torsion
//! wildcard `X` becomes `?`.

use super::error::{ParseErrorKind, ReadError};
use super::traits::{MassTable, ParameterFormat, ParsedParameters, ReadContext};
use super::util::{LineCursor, Location, slice_and_trim};
use crate::core::forcefield::ForceFieldType;
use crate::core::params::identity::{WILDCARD, torsion_id};
use crate::core::params::{
    AngleParam, AtomTypeParam, BondParam, FourierTerm, ImproperParam, LennardJones, Parameter,
    TorsionParam,
};
use std::collections::HashMap;
use std::io::BufRead;
use tracing::debug;

const MASS_TOLERANCE: f64 = 1e-5;

const FRCMOD_SECTIONS: [&str; 6] = ["MASS", "BOND", "ANGL", "DIHE", "IMPR", "NONB"];

/// A complete Amber parameter set (`parm99.dat`, `parm10.dat`, ...).
///
/// Layout: title, masses, one ignored line, bonds, angles, torsions, impropers, two ignored
/// lines, equivalent-type aliases, one ignored line (`MOD4 RE`) and the non-bonded block.
pub struct AmberParmFile;

/// An Amber modification file, with `MASS`, `BOND`, `ANGL`, `DIHE`, `IMPR` and `NONB` blocks
/// each introduced by its keyword line. Blocks may be left out or appear in any order.
pub struct AmberFrcmodFile;

impl ParameterFormat for AmberParmFile {
    const NAME: &'static str = "Amber parm";

    fn read_from(
        reader: &mut impl BufRead,
        ctx: &ReadContext<'_>,
    ) -> Result<ParsedParameters, ReadError> {
        let mut amber = AmberReader::new(reader, ctx, Self::NAME, MassConflicts::FollowPolicy)?;

        amber.lines.skip(1)?;
        amber.read_masses()?;
        amber.lines.skip(1)?;
        amber.read_bonds()?;
        amber.read_angles()?;
        amber.read_torsions()?;
        amber.read_impropers()?;
        amber.lines.skip(2)?;
        let aliases = amber.read_aliases()?;
        amber.lines.skip(1)?;
        amber.read_nonbonded(&aliases)?;

        Ok(amber.finish())
    }
}

impl ParameterFormat for AmberFrcmodFile {
    const NAME: &'static str = "Amber frcmod";

    fn read_from(
        reader: &mut impl BufRead,
        ctx: &ReadContext<'_>,
    ) -> Result<ParsedParameters, ReadError> {
        let mut amber = AmberReader::new(reader, ctx, Self::NAME, MassConflicts::AlwaysFatal)?;
        let aliases = HashMap::new();

        amber.lines.skip(1)?;
        while let Some(keyword) = amber.next_section()? {
            match keyword {
                "MASS" => amber.read_masses()?,
                "BOND" => amber.read_bonds()?,
                "ANGL" => amber.read_angles()?,
                "DIHE" => amber.read_torsions()?,
                "IMPR" => amber.read_impropers()?,
                _ => amber.read_nonbonded(&aliases)?,
            }
        }

        Ok(amber.finish())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MassConflicts {
    FollowPolicy,
    AlwaysFatal,
}

struct AmberReader<'r, 'c, R> {
    lines: LineCursor<&'r mut R>,
    ctx: &'c ReadContext<'c>,
    format: &'static str,
    mass_conflicts: MassConflicts,
    known_masses: MassTable,
    parsed: ParsedParameters,
}

impl<'r, 'c, R: BufRead> AmberReader<'r, 'c, R> {
    fn new(
        reader: &'r mut R,
        ctx: &'c ReadContext<'c>,
        format: &'static str,
        mass_conflicts: MassConflicts,
    ) -> Result<Self, ReadError> {
        if ctx.ff_type != ForceFieldType::Amber {
            return Err(ReadError::UnsupportedForceField {
                format,
                ff_type: ctx.ff_type,
            });
        }
        Ok(Self {
            lines: LineCursor::new(reader),
            ctx,
            format,
            mass_conflicts,
            known_masses: ctx.masses.cloned().unwrap_or_default(),
            parsed: ParsedParameters::default(),
        })
    }

    fn finish(self) -> ParsedParameters {
        debug!(
            "Read {} records and {} masses from {} file",
            self.parsed.len(),
            self.parsed.masses.len(),
            self.format
        );
        self.parsed
    }

    /// Consumes the next frcmod keyword line, skipping blank lines. Returns `None` at end of
    /// file.
    fn next_section(&mut self) -> Result<Option<&'static str>, ReadError> {
        while let Some(line) = self.lines.next_line()? {
            let header = line.trim();
            if header.is_empty() {
                continue;
            }
            let upper = header.to_uppercase();
            return match FRCMOD_SECTIONS.iter().find(|k| upper.starts_with(*k)) {
                Some(&keyword) => Ok(Some(keyword)),
                None => Err(ReadError::UnknownSection {
                    line: self.lines.line_no(),
                    name: header.to_string(),
                }),
            };
        }
        Ok(None)
    }

    fn location(&self, section: &'static str) -> Location<'static> {
        Location::new(self.lines.line_no(), section)
    }

    fn read_masses(&mut self) -> Result<(), ReadError> {
        while let Some(line) = self.lines.next_block_line()? {
            let at = self.location("masses");
            let fields: Vec<&str> = line.split_whitespace().collect();
            at.require_fields(&fields, 2)?;
            let atom_type = amber_type(fields[0]);
            let mass = at.parse_float(fields[1], "mass")?;

            if let Some(&previous) = self.known_masses.get(&atom_type) {
                if (mass - previous).abs() <= MASS_TOLERANCE {
                    continue;
                }
                let conflict = ReadError::MassConflict {
                    line: at.line,
                    atom_type: atom_type.clone(),
                    mass,
                    previous,
                };
                match self.mass_conflicts {
                    MassConflicts::AlwaysFatal => return Err(conflict),
                    MassConflicts::FollowPolicy => self.ctx.policy.escalate(conflict)?,
                }
            }
            self.known_masses.insert(atom_type.clone(), mass);
            self.parsed.masses.insert(atom_type, mass);
        }
        Ok(())
    }

    fn read_bonds(&mut self) -> Result<(), ReadError> {
        while let Some(line) = self.lines.next_block_line()? {
            let at = self.location("bonds");
            let line = line.trim();
            let a = required_type(&at, line, 0, 2)?;
            let b = required_type(&at, line, 3, 5)?;
            let fc = at.parse_column(line, 5, 15)? * 2.0;
            let r0 = at.parse_column(line, 15, 25)?;
            self.parsed.bonds.push(BondParam::new([a.as_str(), b.as_str()], fc, r0));
        }
        Ok(())
    }

    fn read_angles(&mut self) -> Result<(), ReadError> {
        while let Some(line) = self.lines.next_block_line()? {
            let at = self.location("angles");
            let line = line.trim();
            let a = required_type(&at, line, 0, 2)?;
            let b = required_type(&at, line, 3, 5)?;
            let c = required_type(&at, line, 6, 8)?;
            let fc = at.parse_column(line, 8, 18)? * 2.0;
            let theta0 = at.parse_column(line, 18, 28)?;
            self.parsed
                .angles
                .push(AngleParam::new([a.as_str(), b.as_str(), c.as_str()], fc, theta0));
        }
        Ok(())
    }

    /// Consecutive lines continue the same torsion only while the previous line's multiplicity
    /// is negative, which is how Amber marks "more terms follow".
    fn read_torsions(&mut self) -> Result<(), ReadError> {
        let mut pending: Option<TorsionParam> = None;
        let mut previous_multiplicity = 1.0;

        while let Some(line) = self.lines.next_block_line()? {
            let at = self.location("torsions");
            let line = line.trim();
            let types = four_types(&at, line)?;
            let paths = at.parse_column(line, 11, 15)?;
            let fc = at.parse_column(line, 15, 30)?;
            let phase = at.parse_column(line, 30, 45)?;
            let multiplicity = parse_multiplicity(&at, line)?;

            let atom_types = [
                types[0].as_str(),
                types[1].as_str(),
                types[2].as_str(),
                types[3].as_str(),
            ];
            let identity = torsion_id(atom_types);
            let continues_previous = previous_multiplicity < 0.0
                && pending.as_ref().is_some_and(|t| t.identity() == identity);
            if !continues_previous {
                self.parsed.torsions.extend(pending.take());
            }
            previous_multiplicity = multiplicity;

            pending
                .get_or_insert_with(|| TorsionParam::new(atom_types))
                .add_term(FourierTerm::new(fc, multiplicity.abs(), phase, paths))
                .map_err(|source| ReadError::Param {
                    line: at.line,
                    section: at.section.to_string(),
                    source,
                })?;
        }
        self.parsed.torsions.extend(pending);
        Ok(())
    }

    fn read_impropers(&mut self) -> Result<(), ReadError> {
        while let Some(line) = self.lines.next_block_line()? {
            let at = self.location("impropers");
            let line = line.trim();
            let [a, b, center, d] = four_types(&at, line)?;
            let fc = at.parse_column(line, 15, 30)?;
            let phi0 = at.parse_column(line, 30, 45)?;
            let multiplicity = parse_multiplicity(&at, line)?;

            let peripherals = [a.as_str(), b.as_str(), d.as_str()];
            let improper = ImproperParam::new(&center, peripherals, fc, phi0, multiplicity)
                .map_err(|source| ReadError::Param {
                    line: at.line,
                    section: at.section.to_string(),
                    source,
                })?;
            self.parsed.impropers.push(improper);
        }
        Ok(())
    }

    /// Equivalence lines: the first type is the representative, every listed type (itself
    /// included) receives its non-bonded parameters.
    fn read_aliases(&mut self) -> Result<HashMap<String, Vec<String>>, ReadError> {
        let mut aliases = HashMap::new();
        while let Some(line) = self.lines.next_block_line()? {
            let types: Vec<String> = line.split_whitespace().map(amber_type).collect();
            if let Some(representative) = types.first() {
                aliases.insert(representative.clone(), types.clone());
            }
        }
        Ok(aliases)
    }

    fn read_nonbonded(&mut self, aliases: &HashMap<String, Vec<String>>) -> Result<(), ReadError> {
        while let Some(line) = self.lines.next_block_line()? {
            let at = self.location("nonbonded");
            let fields: Vec<&str> = line.split_whitespace().collect();
            at.require_fields(&fields, 3)?;
            let atom_type = amber_type(fields[0]);
            let lj = LennardJones::Arithmetic {
                r_min: at.parse_float(fields[1], "Rmin")?,
                epsilon: at.parse_float(fields[2], "epsilon")?,
            };

            let Some(&mass) = self.known_masses.get(&atom_type) else {
                return Err(ReadError::MissingCrossReference {
                    line: at.line,
                    detail: format!("no mass for atom type '{}'", atom_type),
                });
            };

            match aliases.get(&atom_type) {
                Some(synonyms) => {
                    for synonym in synonyms {
                        self.parsed
                            .atom_types
                            .push(AtomTypeParam::new(synonym, mass, lj));
                    }
                }
                None => self
                    .parsed
                    .atom_types
                    .push(AtomTypeParam::new(&atom_type, mass, lj)),
            }
        }
        Ok(())
    }
}

fn amber_type(raw: &str) -> String {
    raw.trim().replace('*', "star")
}

fn required_type(at: &Location<'_>, line: &str, start: usize, end: usize) -> Result<String, ReadError> {
    let raw = slice_and_trim(line, start, end);
    if raw.is_empty() {
        return Err(at.error(ParseErrorKind::MissingRequiredField {
            columns: format!("{}-{}", start + 1, end),
        }));
    }
    Ok(amber_type(raw))
}

fn four_types(at: &Location<'_>, line: &str) -> Result<[String; 4], ReadError> {
    let wildcard = |t: String| if t == "X" { WILDCARD.to_string() } else { t };
    Ok([
        wildcard(required_type(at, line, 0, 2)?),
        wildcard(required_type(at, line, 3, 5)?),
        wildcard(required_type(at, line, 6, 8)?),
        wildcard(required_type(at, line, 9, 11)?),
    ])
}

/// The multiplicity column is often followed by free text; fall back to a narrower slice.
fn parse_multiplicity(at: &Location<'_>, line: &str) -> Result<f64, ReadError> {
    at.parse_column(line, 45, 60)
        .or_else(|_| at.parse_column(line, 45, 55))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::ParamError;
    use crate::core::policy::ErrorPolicy;
    use std::io::Cursor;

    const PARM: &str = "\
AMBER test parameter set
C  12.01         0.616       sp2 C carbonyl group
CT 12.01         0.878       sp3 aliphatic C
HC 1.008         0.135       H aliph. bond. to C without electrwd. group
O  16.00         0.434       carbonyl group oxygen
N  14.01         0.530       sp2 nitrogen in amide groups
C* 12.01         0.360       sp2 arom. 5 memb.ring w/1 subst. (TRP)

C  H  HO HS HW
CT-HC  340.0    1.090       changed from 331 bsd on NMA nmodes; AA, SUGARS
C -O   570.0    1.229       JCC,7,(1986),230; AA,CYT,GUA,THY,URA

HC-CT-HC    35.0      109.50    AA, SUGARS
C*-CT-HC    50.0      109.50    changed based on NMA nmodes

X -C -N -X    4   10.00       180.0             2.         AA,NMA
CT-CT-OS-CT   1    0.383        0.0            -3.
CT-CT-OS-CT   1    0.1          180.0           2.         Junmei et al, 1999
HC-CT-CT-HC   1    0.15         0.0             3.         Junmei et al, 1999

X -O -C -X          10.5         180.          2.           JCC,7,(1986),230

  HW  OW  0000.     0000.  4.  flag for fast water

C   CT
HC

MOD4      RE
  C           1.9080  0.0860             OPLS
  HC          1.4870  0.0157             OPLS
  C*          1.9080  0.0860             cp C DU

END
";

    fn read_parm(content: &str, policy: ErrorPolicy) -> Result<ParsedParameters, ReadError> {
        let ctx = ReadContext::new(ForceFieldType::Amber, policy);
        AmberParmFile::read_from(&mut Cursor::new(content), &ctx)
    }

    #[test]
    fn reads_masses_with_star_renamed() {
        let parsed = read_parm(PARM, ErrorPolicy::Strict).unwrap();
        assert_eq!(parsed.masses.len(), 6);
        assert_eq!(parsed.masses["Cstar"], 12.01);
        assert_eq!(parsed.masses["HC"], 1.008);
    }

    #[test]
    fn doubles_bond_and_angle_force_constants() {
        let parsed = read_parm(PARM, ErrorPolicy::Strict).unwrap();
        assert_eq!(parsed.bonds.len(), 2);
        assert_eq!(parsed.bonds[0].identity(), "CT HC");
        assert_eq!(parsed.bonds[0].force_constant, 680.0);
        assert_eq!(parsed.bonds[0].r0, 1.09);
        assert_eq!(parsed.angles[1].identity(), "Cstar CT HC");
        assert_eq!(parsed.angles[1].force_constant, 100.0);
    }

    #[test]
    fn groups_torsion_terms_only_after_negative_multiplicity() {
        let parsed = read_parm(PARM, ErrorPolicy::Strict).unwrap();
        assert_eq!(parsed.torsions.len(), 3);

        let generic = &parsed.torsions[0];
        assert_eq!(generic.identity(), "? C N ?");
        assert!(generic.is_generic());
        assert_eq!(generic.terms()[0].force_constant, 10.0);
        assert_eq!(generic.terms()[0].paths, 4.0);

        let ether = &parsed.torsions[1];
        assert_eq!(ether.identity(), "CT CT OS CT");
        let mults: Vec<f64> = ether.terms().iter().map(|t| t.multiplicity).collect();
        assert_eq!(mults, vec![2.0, 3.0]);
    }

    #[test]
    fn improper_center_is_the_third_atom() {
        let parsed = read_parm(PARM, ErrorPolicy::Strict).unwrap();
        assert_eq!(parsed.impropers.len(), 1);
        assert_eq!(parsed.impropers[0].center(), "C");
        assert_eq!(parsed.impropers[0].identity(), "? C O ?");
    }

    #[test]
    fn nonbonded_parameters_are_copied_to_equivalent_types() {
        let parsed = read_parm(PARM, ErrorPolicy::Strict).unwrap();
        let names: Vec<&str> = parsed.atom_types.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["C", "CT", "HC", "Cstar"]);

        let ct = &parsed.atom_types[1];
        assert_eq!(ct.mass, Some(12.01));
        assert_eq!(
            ct.lj,
            LennardJones::Arithmetic {
                r_min: 1.908,
                epsilon: 0.086
            }
        );
    }

    #[test]
    fn nonbonded_type_without_mass_is_a_missing_cross_reference() {
        let content =
            "title\nC  12.01\n\nskip\n\n\n\n\nskip\nskip\n\nMOD4      RE\n  OW  1.7683  0.1520\n";
        let err = read_parm(content, ErrorPolicy::Strict).unwrap_err();
        assert!(matches!(err, ReadError::MissingCrossReference { line: 13, .. }));
    }

    #[test]
    fn masses_from_the_context_resolve_nonbonded_types() {
        let mut masses = MassTable::new();
        masses.insert("OW".to_string(), 16.0);
        let ctx = ReadContext::new(ForceFieldType::Amber, ErrorPolicy::Strict).with_masses(&masses);
        let content = "title\nMASS\n\nBOND\n\nANGL\n\nDIHE\n\nIMPR\n\nNONB\n  OW  1.7683  0.1520\n";

        let parsed = AmberFrcmodFile::read_from(&mut Cursor::new(content), &ctx).unwrap();
        assert_eq!(parsed.atom_types.len(), 1);
        assert_eq!(parsed.atom_types[0].mass, Some(16.0));
        assert!(parsed.masses.is_empty());
    }

    #[test]
    fn parm_mass_conflict_follows_the_policy() {
        let content = "title\nC  12.01\nC  13.00\n";
        assert!(matches!(
            read_parm(content, ErrorPolicy::Strict),
            Err(ReadError::MassConflict { line: 3, .. })
        ));

        let parsed = read_parm(content, ErrorPolicy::Relaxed).unwrap();
        assert_eq!(parsed.masses["C"], 13.0);
    }

    #[test]
    fn frcmod_mass_conflict_is_always_fatal() {
        let mut masses = MassTable::new();
        masses.insert("CT".to_string(), 12.01);
        let ctx =
            ReadContext::new(ForceFieldType::Amber, ErrorPolicy::Relaxed).with_masses(&masses);
        let content = "title\nMASS\nCT  14.00\n";
        let err = AmberFrcmodFile::read_from(&mut Cursor::new(content), &ctx).unwrap_err();
        assert!(matches!(err, ReadError::MassConflict { .. }));
    }

    #[test]
    fn frcmod_reads_all_blocks() {
        let content = "\
Remark line goes here
MASS
OS 16.00       0.465       ether and ester oxygen

BOND
CT-OS  320.0    1.410       JCC,7,(1986),230; AA

ANGL
CT-OS-CT    60.0      109.50    AA

DIHE
CT-OS-CT-CT   1    0.383        0.0            -3.
CT-OS-CT-CT   1    0.1          180.0           2.

IMPR

NONB
  OS          1.6837  0.1700             OPLS ether
";
        let mut masses = MassTable::new();
        masses.insert("CT".to_string(), 12.01);
        let ctx = ReadContext::new(ForceFieldType::Amber, ErrorPolicy::Strict).with_masses(&masses);
        let parsed = AmberFrcmodFile::read_from(&mut Cursor::new(content), &ctx).unwrap();

        assert_eq!(parsed.masses.len(), 1);
        assert_eq!(parsed.bonds[0].force_constant, 640.0);
        assert_eq!(parsed.angles[0].force_constant, 120.0);
        assert_eq!(parsed.torsions.len(), 1);
        assert_eq!(parsed.torsions[0].terms().len(), 2);
        assert_eq!(parsed.atom_types[0].name(), "OS");
        assert_eq!(parsed.atom_types[0].mass, Some(16.0));
    }

    #[test]
    fn frcmod_blocks_may_be_omitted_or_reordered() {
        let ctx = ReadContext::new(ForceFieldType::Amber, ErrorPolicy::Strict);
        let content = "title\nBOND\nCT-OS  320.0    1.410\n\n\nMASS\nOS 16.00\n";
        let parsed = AmberFrcmodFile::read_from(&mut Cursor::new(content), &ctx).unwrap();
        assert_eq!(parsed.bonds.len(), 1);
        assert_eq!(parsed.bonds[0].identity(), "CT OS");
        assert_eq!(parsed.masses.get("OS"), Some(&16.0));
    }

    #[test]
    fn frcmod_rejects_unknown_keywords() {
        let ctx = ReadContext::new(ForceFieldType::Amber, ErrorPolicy::Strict);
        let content = "title\nMASS\nOS 16.00\n\nHBON\n";
        let err = AmberFrcmodFile::read_from(&mut Cursor::new(content), &ctx).unwrap_err();
        assert!(matches!(
            err,
            ReadError::UnknownSection { line: 5, ref name } if name == "HBON"
        ));
    }

    #[test]
    fn frcmod_may_end_after_any_block() {
        let ctx = ReadContext::new(ForceFieldType::Amber, ErrorPolicy::Strict);
        let content = "title\nMASS\nOS 16.00\n\nBOND\nCT-OS  320.0    1.410\n";
        let parsed = AmberFrcmodFile::read_from(&mut Cursor::new(content), &ctx).unwrap();
        assert_eq!(parsed.bonds.len(), 1);
        assert!(parsed.angles.is_empty());
    }

    #[test]
    fn improper_with_unsupported_multiplicity_is_rejected() {
        let ctx = ReadContext::new(ForceFieldType::Amber, ErrorPolicy::Strict);
        let content = "t\nMASS\n\nBOND\n\nANGL\n\nDIHE\n\nIMPR\nX -O -C -X          10.5         180.          3.\n";
        let err = AmberFrcmodFile::read_from(&mut Cursor::new(content), &ctx).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Param {
                source: ParamError::UnsupportedMultiplicity { .. },
                ..
            }
        ));
    }

    #[test]
    fn amber_formats_require_an_amber_parameter_set() {
        let ctx = ReadContext::new(ForceFieldType::OplsAa, ErrorPolicy::Strict);
        let err = AmberParmFile::read_from(&mut Cursor::new(PARM), &ctx).unwrap_err();
        assert!(matches!(
            err,
            ReadError::UnsupportedForceField {
                ff_type: ForceFieldType::OplsAa,
                ..
            }
        ));
    }

    #[test]
    fn malformed_column_is_a_parse_error() {
        let content = "title\nCT 12.01\n\n\nCT-HC  abc      1.090\n";
        let err = read_parm(content, ErrorPolicy::Strict).unwrap_err();
        assert!(matches!(err, ReadError::Parse { line: 5, .. }));
    }
}
