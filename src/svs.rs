//! Command strings for the spatial visual system (SVS) scene graph.
//!
//! Each function returns one command for the runtime's `svs` interface, e.g.
//! `add box1 world v <verts> p 1.000000 0.000000 0.000000`. Vectors are
//! printed with six decimals.

/// An `[x, y, z]` triple: position, rotation or scale.
pub type Vec3 = [f64; 3];

/// Vertices of a unit cube centered at the origin.
pub const BBOX_VERTS: &str = "0.5 0.5 0.5 0.5 0.5 -0.5 0.5 -0.5 0.5 0.5 -0.5 -0.5 \
                              -0.5 0.5 0.5 -0.5 0.5 -0.5 -0.5 -0.5 0.5 -0.5 -0.5 -0.5";

pub fn bbox_verts() -> &'static str {
    BBOX_VERTS
}

fn vec3(v: Vec3) -> String {
    format!("{:.6} {:.6} {:.6}", v[0], v[1], v[2])
}

/// Parent used when the caller has no better place in the scene graph.
pub const WORLD: &str = "world";

fn push_transform(cmd: &mut String, pos: Option<Vec3>, rot: Option<Vec3>, scl: Option<Vec3>) {
    for (flag, v) in [("p", pos), ("r", rot), ("s", scl)] {
        if let Some(v) = v {
            cmd.push(' ');
            cmd.push_str(flag);
            cmd.push(' ');
            cmd.push_str(&vec3(v));
        }
    }
}

/// Add an empty node under `parent`, optionally placed, rotated and scaled.
pub fn add_node(
    id: &str,
    parent: &str,
    pos: Option<Vec3>,
    rot: Option<Vec3>,
    scl: Option<Vec3>,
) -> String {
    let mut cmd = format!("add {id} {parent}");
    push_transform(&mut cmd, pos, rot, scl);
    cmd
}

/// Add a unit box under `parent`, optionally placed, rotated and scaled.
pub fn add_box(
    id: &str,
    parent: &str,
    pos: Option<Vec3>,
    rot: Option<Vec3>,
    scl: Option<Vec3>,
) -> String {
    let mut cmd = format!("add {id} {parent} v {BBOX_VERTS}");
    push_transform(&mut cmd, pos, rot, scl);
    cmd
}

pub fn change_pos(id: &str, pos: Vec3) -> String {
    format!("change {id} p {}", vec3(pos))
}

pub fn change_rot(id: &str, rot: Vec3) -> String {
    format!("change {id} r {}", vec3(rot))
}

pub fn change_scl(id: &str, scl: Vec3) -> String {
    format!("change {id} s {}", vec3(scl))
}

pub fn delete(id: &str) -> String {
    format!("delete {id}")
}

pub fn add_tag(id: &str, name: &str, value: &str) -> String {
    format!("tag add {id} {name} {value}")
}

pub fn change_tag(id: &str, name: &str, value: &str) -> String {
    format!("tag change {id} {name} {value}")
}

pub fn delete_tag(id: &str, name: &str) -> String {
    format!("tag delete {id} {name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_has_eight_vertices() {
        let coords: Vec<f64> = bbox_verts()
            .split_whitespace()
            .map(|c| c.parse().unwrap())
            .collect();
        assert_eq!(coords.len(), 24);
        assert!(coords.iter().all(|c| c.abs() == 0.5));
    }

    #[test]
    fn add_box_flags() {
        assert_eq!(add_box("b1", WORLD, None, None, None), format!("add b1 world v {BBOX_VERTS}"));
        let cmd = add_box("b1", WORLD, Some([1.0, 2.5, -3.0]), None, Some([0.1, 0.1, 0.1]));
        assert!(cmd.ends_with(
            " p 1.000000 2.500000 -3.000000 s 0.100000 0.100000 0.100000"
        ));
        assert!(!cmd.contains(" r "));
    }

    #[test]
    fn boxes_and_nodes_under_a_parent() {
        assert_eq!(
            add_box("b2", "table", None, None, None),
            format!("add b2 table v {BBOX_VERTS}")
        );
        assert_eq!(add_node("arm", "robot", None, None, None), "add arm robot");
        assert_eq!(
            add_node("hand", "arm", None, Some([0.0, 0.0, 1.0]), None),
            "add hand arm r 0.000000 0.000000 1.000000"
        );
        assert!(!add_node("n1", WORLD, None, None, None).contains(" v "));
    }

    #[test]
    fn change_and_tag_commands() {
        assert_eq!(change_pos("b1", [0.0, 0.0, 1.0]), "change b1 p 0.000000 0.000000 1.000000");
        assert_eq!(change_rot("b1", [0.0, 1.5, 0.0]), "change b1 r 0.000000 1.500000 0.000000");
        assert_eq!(change_scl("b1", [2.0, 2.0, 2.0]), "change b1 s 2.000000 2.000000 2.000000");
        assert_eq!(delete("b1"), "delete b1");
        assert_eq!(add_tag("b1", "color", "red"), "tag add b1 color red");
        assert_eq!(change_tag("b1", "color", "blue"), "tag change b1 color blue");
        assert_eq!(delete_tag("b1", "color"), "tag delete b1 color");
    }
}
