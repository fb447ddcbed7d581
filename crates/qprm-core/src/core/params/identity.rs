//! Canonical identities of parameter records.
//!
//! An identity is a space-joined sequence of atom-type names chosen so that every way of
//! writing down the same physical parameter yields the same string:
//!
//! | class     | rule                                                                 |
//! |-----------|----------------------------------------------------------------------|
//! | atom type | the name itself                                                      |
//! | bond      | both names sorted                                                    |
//! | angle     | the smaller of the forward and reversed sequence                     |
//! | torsion   | the smaller of the forward and reversed sequence                     |
//! | improper  | center fixed in second place, concrete peripherals sorted around it  |
//!
//! All functions are total; arity is enforced by the array types.

/// Placeholder for "any atom type" in generic torsions and impropers.
pub const WILDCARD: &str = "?";

pub fn is_wildcard(atom_type: &str) -> bool {
    atom_type == WILDCARD
}

pub fn atom_type_id(name: &str) -> String {
    name.to_string()
}

pub fn bond_id(atom_types: [&str; 2]) -> String {
    let mut sorted = atom_types;
    sorted.sort_unstable();
    sorted.join(" ")
}

pub fn angle_id(atom_types: [&str; 3]) -> String {
    reversible_id(&atom_types)
}

pub fn torsion_id(atom_types: [&str; 4]) -> String {
    reversible_id(&atom_types)
}

/// Identity of an improper around `center`.
///
/// Wildcards among the peripherals are pushed to the free slots: with two concrete peripherals
/// the key is `? C p1 p2`, with one it is `? C p1 ?`.
pub fn improper_id(center: &str, peripherals: [&str; 3]) -> String {
    let mut concrete: Vec<&str> = peripherals
        .into_iter()
        .filter(|t| !is_wildcard(t))
        .collect();
    concrete.sort_unstable();

    let tokens = match concrete.as_slice() {
        [a, b, c] => [*a, center, *b, *c],
        [a, b] => [WILDCARD, center, *a, *b],
        [a] => [WILDCARD, center, *a, WILDCARD],
        _ => [WILDCARD, center, WILDCARD, WILDCARD],
    };
    tokens.join(" ")
}

/// Number of wildcard slots in an identity.
pub fn wildcard_count(identity: &str) -> usize {
    identity.split(' ').filter(|t| is_wildcard(t)).count()
}

fn reversible_id(atom_types: &[&str]) -> String {
    let reversed: Vec<&str> = atom_types.iter().rev().copied().collect();
    if reversed.as_slice() < atom_types {
        reversed.join(" ")
    } else {
        atom_types.join(" ")
    }
}

/// Splits an identity back into its `N` atom-type tokens.
pub(crate) fn tokens<const N: usize>(identity: &str) -> [String; N] {
    let mut parts = identity.split(' ');
    std::array::from_fn(|_| parts.next().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_id_is_order_independent() {
        assert_eq!(bond_id(["CT", "HC"]), "CT HC");
        assert_eq!(bond_id(["HC", "CT"]), "CT HC");
    }

    #[test]
    fn angle_id_picks_smaller_of_forward_and_reverse() {
        assert_eq!(angle_id(["HC", "CT", "CA"]), "CA CT HC");
        assert_eq!(angle_id(["CA", "CT", "HC"]), "CA CT HC");
    }

    #[test]
    fn angle_id_keeps_vertex_in_the_middle() {
        let id = angle_id(["OS", "CA", "CT"]);
        assert_eq!(id.split(' ').nth(1), Some("CA"));
    }

    #[test]
    fn torsion_id_is_invariant_under_reversal() {
        let forward = torsion_id(["OG1", "CG", "CB", "CA"]);
        let backward = torsion_id(["CA", "CB", "CG", "OG1"]);
        assert_eq!(forward, backward);
        assert_eq!(forward, "CA CB CG OG1");
    }

    #[test]
    fn torsion_id_compares_whole_sequences_not_ends() {
        // equal first tokens: the decision falls to the second position
        assert_eq!(torsion_id(["C", "N", "CA", "C"]), "C CA N C");
    }

    #[test]
    fn improper_id_is_invariant_under_peripheral_permutation() {
        let expected = "CB CG OG1 OG2";
        for peripherals in [
            ["CB", "OG1", "OG2"],
            ["OG1", "CB", "OG2"],
            ["OG2", "OG1", "CB"],
            ["OG1", "OG2", "CB"],
        ] {
            assert_eq!(improper_id("CG", peripherals), expected);
        }
    }

    #[test]
    fn improper_id_fills_free_slots_with_wildcards() {
        assert_eq!(improper_id("C", ["O", "?", "N"]), "? C N O");
        assert_eq!(improper_id("C", ["?", "O", "?"]), "? C O ?");
        assert_eq!(improper_id("C", ["?", "?", "?"]), "? C ? ?");
    }

    #[test]
    fn wildcard_count_counts_only_whole_tokens() {
        assert_eq!(wildcard_count("? CT CT ?"), 2);
        assert_eq!(wildcard_count("CA CB CG OG1"), 0);
    }

    #[test]
    fn tokens_splits_identity_into_fixed_array() {
        let parts: [String; 3] = tokens("CA CT HC");
        assert_eq!(parts, ["CA", "CT", "HC"].map(String::from));
    }
}
