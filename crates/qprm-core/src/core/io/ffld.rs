use super::error::ReadError;
use super::traits::{ParameterFormat, ParsedParameters, ReadContext};
use super::util::Location;
use super::xref::StructureReference;
use crate::core::forcefield::{ForceFieldType, element_mass};
use crate::core::params::{
    AngleParam, AtomTypeParam, BondParam, FourierTerm, ImproperParam, LennardJones, TorsionParam,
};
use crate::core::policy::ErrorPolicy;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::{debug, warn};

const TORSION_MULTIPLICITIES: [f64; 4] = [1.0, 2.0, 3.0, 4.0];
const TORSION_PHASES: [f64; 4] = [0.0, 180.0, 0.0, 180.0];
const NEGLIGIBLE_AMPLITUDE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Atoms,
    Bonds,
    Angles,
    Torsions,
    Impropers,
}

impl Section {
    /// Header lines are recognized by their literal beginning.
    const HEADERS: [(&'static str, Section); 5] = [
        ("atom   type  vdw  symbol", Section::Atoms),
        ("Stretch            k", Section::Bonds),
        ("Bending                      k", Section::Angles),
        ("proper Torsion", Section::Torsions),
        ("improper", Section::Impropers),
    ];

    fn from_header(line: &str) -> Option<Self> {
        Self::HEADERS
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix))
            .map(|&(_, section)| section)
    }

    fn name(self) -> &'static str {
        match self {
            Section::Atoms => "atoms",
            Section::Bonds => "stretch",
            Section::Angles => "bending",
            Section::Torsions => "proper torsion",
            Section::Impropers => "improper torsion",
        }
    }
}

/// OPLS-AA parameters exported by Macromodel/ffld_server.
///
/// FFLD files name atoms only locally (`C1`, `H2`, ...), so each atom line is matched, in
/// order, to an atom of the [`StructureReference`] the file was generated from; atom types are
/// named `residue.atom` after that atom.
pub struct FfldFile;

impl ParameterFormat for FfldFile {
    const NAME: &'static str = "FFLD";

    fn read_from(
        reader: &mut impl BufRead,
        ctx: &ReadContext<'_>,
    ) -> Result<ParsedParameters, ReadError> {
        if ctx.ff_type != ForceFieldType::OplsAa {
            return Err(ReadError::UnsupportedForceField {
                format: Self::NAME,
                ff_type: ctx.ff_type,
            });
        }
        let structure = ctx.structure.ok_or(ReadError::MissingStructure {
            format: Self::NAME,
        })?;

        let mut ffld = FfldReader {
            structure,
            policy: ctx.policy,
            atom_types: HashMap::new(),
            atom_count: 0,
            parsed: ParsedParameters::default(),
        };
        let mut section: Option<Section> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let line = line.trim();

            if line.is_empty() || line.contains("------") {
                continue;
            }
            if let Some(found) = Section::from_header(line) {
                debug!("Entering FFLD {} section on line {}", found.name(), line_num);
                section = Some(found);
                continue;
            }
            let Some(section) = section else {
                continue;
            };

            let at = Location::new(line_num, section.name());
            let fields: Vec<&str> = line.split_whitespace().collect();
            match section {
                Section::Atoms => ffld.read_atom(&at, &fields)?,
                Section::Bonds => ffld.read_bond(&at, &fields)?,
                Section::Angles => ffld.read_angle(&at, &fields)?,
                Section::Torsions => ffld.read_torsion(&at, &fields)?,
                Section::Impropers => ffld.read_improper(&at, &fields)?,
            }
        }

        Ok(ffld.parsed)
    }
}

struct FfldReader<'a> {
    structure: &'a StructureReference,
    policy: ErrorPolicy,
    /// FFLD atom name to generated atom-type name.
    atom_types: HashMap<String, String>,
    atom_count: usize,
    parsed: ParsedParameters,
}

impl FfldReader<'_> {
    // C1      135  C1   CT      -0.0175   3.5000   0.0660 high   C: alkanes
    fn read_atom(&mut self, at: &Location<'_>, fields: &[&str]) -> Result<(), ReadError> {
        at.require_fields(fields, 7)?;
        let (name, type_id, vdw, symbol) = (fields[0], fields[1], fields[2], fields[3]);
        at.parse_float(fields[4], "charge")?;
        let sigma = at.parse_float(fields[5], "sigma")?;
        let epsilon = at.parse_float(fields[6], "epsilon")?;
        let comment = format!(
            "FFLD: {}_{}_{} {}",
            symbol,
            vdw,
            type_id,
            fields.get(8..).unwrap_or_default().join(" ")
        );

        let element: String = vdw.chars().filter(|c| c.is_alphabetic()).collect();
        let mass = element_mass(&element);
        if mass.is_none() {
            warn!(
                "Line {}: no mass for element '{}' (atom '{}'), set it manually",
                at.line, element, name
            );
        }

        let Some(reference) = self.structure.atoms().get(self.atom_count) else {
            return Err(ReadError::MissingCrossReference {
                line: at.line,
                detail: format!(
                    "atom '{}' has no counterpart in the structure ({} atoms)",
                    name,
                    self.structure.len()
                ),
            });
        };
        if !same_first_letter(name, &reference.name) {
            self.policy.escalate(ReadError::ElementMismatch {
                line: at.line,
                structure: reference.name.clone(),
                ffld: name.to_string(),
            })?;
        }

        let atom_type = reference.atom_type();
        let lj = LennardJones::from_sigma_epsilon(sigma, epsilon);
        let atom = match mass {
            Some(mass) => AtomTypeParam::new(&atom_type, mass, lj),
            None => AtomTypeParam::with_unknown_mass(&atom_type, lj),
        };
        self.parsed.atom_types.push(atom.with_comment(comment));
        self.atom_types.insert(name.to_string(), atom_type);
        self.atom_count += 1;
        Ok(())
    }

    // C1      H2      340.00000    1.09000   high      140  0   CT  -HC    ==> CT  -HC
    fn read_bond(&mut self, at: &Location<'_>, fields: &[&str]) -> Result<(), ReadError> {
        at.require_fields(fields, 4)?;
        let fc = at.parse_float(fields[2], "k")?;
        let r0 = at.parse_float(fields[3], "r0")?;
        let [a, b] = self.resolve(at, [fields[0], fields[1]])?;
        let bond = BondParam::new([a, b], fc * 2.0, r0).with_comment(ffld_comment(fields, 4));
        self.parsed.bonds.push(bond);
        Ok(())
    }

    // H2      C1      H3        33.00000  107.80000   high      ...
    fn read_angle(&mut self, at: &Location<'_>, fields: &[&str]) -> Result<(), ReadError> {
        at.require_fields(fields, 5)?;
        let fc = at.parse_float(fields[3], "k")?;
        let theta0 = at.parse_float(fields[4], "theta0")?;
        let [a, b, c] = self.resolve(at, [fields[0], fields[1], fields[2]])?;
        let angle =
            AngleParam::new([a, b, c], fc * 2.0, theta0).with_comment(ffld_comment(fields, 5));
        self.parsed.angles.push(angle);
        Ok(())
    }

    // O2      P1      O3      C4        0.000   0.000   0.562   0.000    high ...
    fn read_torsion(&mut self, at: &Location<'_>, fields: &[&str]) -> Result<(), ReadError> {
        at.require_fields(fields, 8)?;
        let mut amplitudes = [0.0; 4];
        for (i, amplitude) in amplitudes.iter_mut().enumerate() {
            *amplitude = at.parse_float(fields[4 + i], &format!("V{}", i + 1))?;
        }
        let atom_types = self.resolve(at, [fields[0], fields[1], fields[2], fields[3]])?;

        let mut torsion = TorsionParam::new(atom_types).with_comment(ffld_comment(fields, 8));
        let terms = amplitudes
            .iter()
            .zip(TORSION_MULTIPLICITIES.iter().zip(TORSION_PHASES))
            .filter(|(v, _)| v.abs() > NEGLIGIBLE_AMPLITUDE)
            .map(|(v, (&n, phase))| FourierTerm::new(v / 2.0, n, phase, 1.0))
            .collect::<Vec<_>>();
        let terms = if terms.is_empty() {
            vec![FourierTerm::new(0.0, 1.0, 0.0, 1.0)]
        } else {
            terms
        };
        for term in terms {
            torsion.add_term(term).map_err(|source| ReadError::Param {
                line: at.line,
                section: at.section.to_string(),
                source,
            })?;
        }
        self.parsed.torsions.push(torsion);
        Ok(())
    }

    // C21     C22     C20     O19       2.200   high   ...
    fn read_improper(&mut self, at: &Location<'_>, fields: &[&str]) -> Result<(), ReadError> {
        at.require_fields(fields, 5)?;
        let v = at.parse_float(fields[4], "V2")?;
        let [a, b, center, d] = self.resolve(at, [fields[0], fields[1], fields[2], fields[3]])?;
        let improper = ImproperParam::new(center, [a, b, d], v / 2.0, 180.0, 2.0)
            .map_err(|source| ReadError::Param {
                line: at.line,
                section: at.section.to_string(),
                source,
            })?;
        self.parsed
            .impropers
            .push(improper.with_comment(ffld_comment(fields, 5)));
        Ok(())
    }

    fn resolve<const N: usize>(
        &self,
        at: &Location<'_>,
        names: [&str; N],
    ) -> Result<[&str; N], ReadError> {
        let mut resolved = [""; N];
        for (slot, name) in resolved.iter_mut().zip(names) {
            *slot = self
                .atom_types
                .get(name)
                .ok_or_else(|| ReadError::MissingCrossReference {
                    line: at.line,
                    detail: format!("atom '{}' is not defined in the atoms section", name),
                })?;
        }
        Ok(resolved)
    }
}

fn ffld_comment(fields: &[&str], from: usize) -> String {
    format!("FFLD: {}", fields.get(from..).unwrap_or_default().join(" "))
}

fn same_first_letter(a: &str, b: &str) -> bool {
    let first = |s: &str| s.chars().next().map(|c| c.to_ascii_lowercase());
    first(a) == first(b)
}
