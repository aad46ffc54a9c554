use crate::{config::Instance, error::StarError, Graph};
use log::warn;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{anychar, char, digit1, space0},
    combinator::{all_consuming, map, map_res, opt, rest, verify},
    multi::{count, separated_list0},
    sequence::{delimited, preceded, separated_pair, tuple},
    IResult,
};
use std::path::Path;

/// Largest order representable by the 4-byte graph6 header
pub const GRAPH6_MAX_ORDER: usize = 258_047;

/// Parse one graph6 data character, returning its 6-bit value
fn sextet(input: &str) -> IResult<&str, u32> {
    map(verify(anychar, |c: &char| ('?'..='~').contains(c)), |c| c as u32 - 63)(input)
}

/// Parse the vertex count: one byte for n <= 62, otherwise `~` and three bytes
fn graph6_order(input: &str) -> IResult<&str, usize> {
    alt((
        map(
            preceded(char('~'), tuple((verify(sextet, |x: &u32| *x < 63), sextet, sextet))),
            |(a, b, c)| ((a << 12) | (b << 6) | c) as usize,
        ),
        map(verify(sextet, |x: &u32| *x < 63), |x| x as usize),
    ))(input)
}

/// Number of data characters holding the upper triangle of an n-vertex graph
fn graph6_body_len(n: usize) -> usize {
    (n * n.saturating_sub(1) / 2).div_ceil(6)
}

/// Parse a complete graph6 string: optional header, order, then the upper triangle
fn graph6(input: &str) -> IResult<&str, (usize, Vec<u32>)> {
    let (input, _) = opt(tag(">>graph6<<"))(input)?;
    let (input, n) = graph6_order(input)?;
    let (input, body) = count(sextet, graph6_body_len(n))(input)?;
    Ok((input, (n, body)))
}

/// Decode a graph6 string such as `IxKOgGDA_`.
pub fn parse_graph6(input: &str) -> Result<Graph, StarError> {
    let text = input.trim();
    let (n, body) = match all_consuming(graph6)(text) {
        Ok((_, parsed)) => parsed,
        Err(e) => {
            return Err(StarError::Graph6 {
                input: text.to_string(),
                reason: e.to_string(),
            })
        }
    };

    let mut g = Graph::new(n);
    let mut k = 0usize;
    for j in 1..n {
        for i in 0..j {
            if (body[k / 6] >> (5 - k % 6)) & 1 == 1 {
                g.add_edge(i, j);
            }
            k += 1;
        }
    }
    Ok(g)
}

/// Encode a graph as graph6 (without the `>>graph6<<` header).
pub fn to_graph6(g: &Graph) -> Result<String, StarError> {
    let n = g.num_vertices();
    let mut out = String::new();
    if n <= 62 {
        out.push(char::from(n as u8 + 63));
    } else if n <= GRAPH6_MAX_ORDER {
        out.push('~');
        for shift in [12, 6, 0] {
            out.push(char::from(((n >> shift) & 0x3f) as u8 + 63));
        }
    } else {
        return Err(StarError::Graph6 {
            input: format!("<graph on {} vertices>", n),
            reason: format!("order exceeds {}", GRAPH6_MAX_ORDER),
        });
    }

    let mut word = 0u8;
    let mut filled = 0;
    for j in 1..n {
        for i in 0..j {
            word = (word << 1) | g.has_edge(i, j) as u8;
            filled += 1;
            if filled == 6 {
                out.push(char::from(word + 63));
                word = 0;
                filled = 0;
            }
        }
    }
    if filled > 0 {
        out.push(char::from((word << (6 - filled)) + 63));
    }
    Ok(out)
}

/// Parse a single unsigned integer
fn parse_usize(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |s: &str| s.parse::<usize>())(input)
}

/// Parse a comma-separated list of vertices; the empty list is allowed
fn parse_vertex_list(input: &str) -> IResult<&str, Vec<usize>> {
    delimited(
        space0,
        separated_list0(delimited(space0, char(','), space0), parse_usize),
        space0,
    )(input)
}

/// Parse `key=value`, keys being identifiers
fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        preceded(space0, take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')),
        delimited(space0, char('='), space0),
        rest,
    )(input)
}

fn instance_error(line: usize, reason: impl Into<String>) -> StarError {
    StarError::Instance {
        line,
        reason: reason.into(),
    }
}

fn number_value(line: usize, value: &str) -> Result<usize, StarError> {
    match all_consuming(delimited(space0, parse_usize, space0))(value) {
        Ok((_, v)) => Ok(v),
        Err(e) => Err(instance_error(line, format!("expected a number, got {:?}: {}", value, e))),
    }
}

fn list_value(line: usize, value: &str) -> Result<Vec<usize>, StarError> {
    match all_consuming(parse_vertex_list)(value) {
        Ok((_, v)) => Ok(v),
        Err(e) => Err(instance_error(
            line,
            format!("expected a vertex list, got {:?}: {}", value, e),
        )),
    }
}

/// Parse an instance description made of `key=value` lines.
///
/// `#` starts a comment line. Required keys: `num_colors`, `num_precolored_verts`, `G`.
pub fn parse_instance(input: &str) -> Result<Instance, StarError> {
    let mut n = None;
    let mut num_colors = None;
    let mut num_precolored_verts = None;
    let mut graph = None;
    let mut precolor_verts = Vec::new();
    let mut recolor_verts = Vec::new();
    let mut extend_verts = Vec::new();
    let mut parallel_depth = None;

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (key, value) = match key_value(trimmed) {
            Ok((_, kv)) => kv,
            Err(e) => return Err(instance_error(line, format!("expected key=value: {}", e))),
        };

        match key {
            "n" => n = Some(number_value(line, value)?),
            "num_colors" => num_colors = Some(number_value(line, value)?),
            "num_precolored_verts" => num_precolored_verts = Some(number_value(line, value)?),
            "G" => graph = Some(parse_graph6(value)?),
            "precolor_verts" => precolor_verts = list_value(line, value)?,
            "recolor_verts" => recolor_verts = list_value(line, value)?,
            "extend_verts" => extend_verts = list_value(line, value)?,
            "parallel_depth" => parallel_depth = Some(number_value(line, value)?),
            other => warn!("line {}: ignoring unknown key `{}`", line, other),
        }
    }

    let graph = graph.ok_or(StarError::MissingKey("G"))?;
    if let Some(n) = n {
        if n != graph.num_vertices() {
            return Err(StarError::Config(format!(
                "n={} but G has {} vertices",
                n,
                graph.num_vertices()
            )));
        }
    }

    Ok(Instance {
        graph,
        num_colors: num_colors.ok_or(StarError::MissingKey("num_colors"))?,
        num_precolored_verts: num_precolored_verts
            .ok_or(StarError::MissingKey("num_precolored_verts"))?,
        precolor_verts,
        recolor_verts,
        extend_verts,
        parallel_depth,
    })
}

/// Parse an instance file
pub fn parse_instance_file(path: &Path) -> Result<Instance, StarError> {
    let content = std::fs::read_to_string(path).map_err(|source| StarError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_instance(&content)
}

/// Render an instance in the format read by [`parse_instance`]
pub fn format_instance(instance: &Instance) -> Result<String, StarError> {
    let list = |vs: &[usize]| vs.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",");

    let mut out = String::new();
    out.push_str(&format!("n={}\n", instance.graph.num_vertices()));
    out.push_str(&format!("num_colors={}\n", instance.num_colors));
    out.push_str(&format!("num_precolored_verts={}\n", instance.num_precolored_verts));
    out.push_str(&format!("G={}\n", to_graph6(&instance.graph)?));
    out.push_str(&format!("precolor_verts={}\n", list(&instance.precolor_verts)));
    out.push_str(&format!("recolor_verts={}\n", list(&instance.recolor_verts)));
    out.push_str(&format!("extend_verts={}\n", list(&instance.extend_verts)));
    if let Some(depth) = instance.parallel_depth {
        out.push_str(&format!("parallel_depth={}\n", depth));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_driver_graph() {
        let g = parse_graph6("IxKOgGDA_").unwrap();
        assert_eq!(g.num_vertices(), 10);
        assert_eq!(g.num_edges(), 14);
        assert!(g.has_edge(0, 1) && g.has_edge(4, 9) && g.has_edge(6, 9));
        assert!(!g.has_edge(0, 3));
        let degrees: Vec<usize> = g.vertices().map(|v| g.degree(v)).collect();
        assert_eq!(degrees, vec![2, 2, 4, 4, 3, 4, 3, 2, 2, 2]);
    }

    #[test]
    fn test_encode_matches_decode() {
        let g = parse_graph6("IxKOgGDA_").unwrap();
        assert_eq!(to_graph6(&g).unwrap(), "IxKOgGDA_");

        // 4-cycle 0-1-2-3-0: bits 1,0,1,1,0,1 -> 45 -> 'l'
        let c4 = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(to_graph6(&c4).unwrap(), "Cl");
        assert_eq!(parse_graph6("Cl").unwrap(), c4);
    }

    #[test]
    fn test_header_and_whitespace() {
        let g = parse_graph6(">>graph6<<Cl\n").unwrap();
        assert_eq!(g.num_edges(), 4);
        assert_eq!(parse_graph6("?").unwrap().num_vertices(), 0);
        assert_eq!(parse_graph6("@").unwrap().num_vertices(), 1);
    }

    #[test]
    fn test_long_order_header() {
        let g = Graph::new(63);
        let encoded = to_graph6(&g).unwrap();
        assert!(encoded.starts_with("~??~"));
        assert_eq!(parse_graph6(&encoded).unwrap().num_vertices(), 63);
    }

    #[test]
    fn test_bad_graph6_is_rejected() {
        assert!(parse_graph6("").is_err());
        assert!(parse_graph6("C").is_err()); // body too short
        assert!(parse_graph6("Cll").is_err()); // trailing data
        assert!(parse_graph6("C l").is_err());
    }

    #[test]
    fn test_parse_instance() {
        let text = "\
# driver instance
n=10
num_colors=6
num_precolored_verts = 9
G=IxKOgGDA_
precolor_verts=4, 6,3,2,5,8,7,1,0
recolor_verts=
extend_verts=9
parallel_depth=6
";
        let instance = parse_instance(text).unwrap();
        assert_eq!(instance.graph.num_vertices(), 10);
        assert_eq!(instance.num_colors, 6);
        assert_eq!(instance.num_precolored_verts, 9);
        assert_eq!(instance.precolor_verts, vec![4, 6, 3, 2, 5, 8, 7, 1, 0]);
        assert!(instance.recolor_verts.is_empty());
        assert_eq!(instance.extend_verts, vec![9]);
        assert_eq!(instance.parallel_depth, Some(6));

        let again = parse_instance(&format_instance(&instance).unwrap()).unwrap();
        assert_eq!(again, instance);
    }

    #[test]
    fn test_instance_errors() {
        assert!(matches!(
            parse_instance("num_colors=3\nnum_precolored_verts=0\n"),
            Err(StarError::MissingKey("G"))
        ));
        assert!(matches!(
            parse_instance("n=5\nnum_colors=3\nnum_precolored_verts=0\nG=Cl\n"),
            Err(StarError::Config(_))
        ));
        assert!(matches!(
            parse_instance("num_colors=three\n"),
            Err(StarError::Instance { line: 1, .. })
        ));
        assert!(matches!(
            parse_instance("num_colors=3\njust some words\n"),
            Err(StarError::Instance { line: 2, .. })
        ));
    }
}
