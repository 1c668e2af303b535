//! Builder for synthetic MODFLOW 6 binary grid files.

use crate::writer::Writer;
use gw_common::Precision;
use std::path::Path;

const LENTXT: usize = 100;

#[derive(Debug, Clone)]
enum GrbValue {
    Integer(Vec<i32>, Vec<usize>),
    Double(Vec<f64>, Vec<usize>),
}

/// Builder for `.grb` files with a DIS or DISV discretization.
///
/// Connectivity arrays (`IA`/`JA`) are written with a trivial diagonal-only
/// pattern; readers that only need geometry ignore them.
#[derive(Debug, Clone)]
pub struct GrbFileBuilder {
    grid_type: &'static str,
    arrays: Vec<(&'static str, GrbValue)>,
}

fn scalar_i(v: i32) -> GrbValue {
    GrbValue::Integer(vec![v], Vec::new())
}

fn scalar_d(v: f64) -> GrbValue {
    GrbValue::Double(vec![v], Vec::new())
}

fn diagonal(ncells: usize) -> (Vec<i32>, Vec<i32>) {
    let ia = (1..=ncells as i32 + 1).collect();
    let ja = (1..=ncells as i32).collect();
    (ia, ja)
}

impl GrbFileBuilder {
    /// Structured grid with origin `(xorigin, yorigin)` at the lower-left corner.
    #[allow(clippy::too_many_arguments)]
    pub fn dis(
        ncol: usize,
        nrow: usize,
        nlay: usize,
        delr: &[f64],
        delc: &[f64],
        xorigin: f64,
        yorigin: f64,
        angrot: f64,
        idomain: Option<Vec<i32>>,
    ) -> Self {
        let ncells = ncol * nrow * nlay;
        let (ia, ja) = diagonal(ncells);
        let arrays = vec![
            ("NCELLS", scalar_i(ncells as i32)),
            ("NLAY", scalar_i(nlay as i32)),
            ("NROW", scalar_i(nrow as i32)),
            ("NCOL", scalar_i(ncol as i32)),
            ("NJA", scalar_i(ncells as i32)),
            ("XORIGIN", scalar_d(xorigin)),
            ("YORIGIN", scalar_d(yorigin)),
            ("ANGROT", scalar_d(angrot)),
            ("DELR", GrbValue::Double(delr.to_vec(), vec![ncol])),
            ("DELC", GrbValue::Double(delc.to_vec(), vec![nrow])),
            ("TOP", GrbValue::Double(vec![0.0; ncol * nrow], vec![ncol * nrow])),
            ("BOTM", GrbValue::Double(vec![-1.0; ncells], vec![ncells])),
            ("IA", GrbValue::Integer(ia, vec![ncells + 1])),
            ("JA", GrbValue::Integer(ja, vec![ncells])),
            (
                "IDOMAIN",
                GrbValue::Integer(idomain.unwrap_or_else(|| vec![1; ncells]), vec![ncells]),
            ),
            ("ICELLTYPE", GrbValue::Integer(vec![1; ncells], vec![ncells])),
        ];
        Self {
            grid_type: "DIS",
            arrays,
        }
    }

    /// Vertex grid; `cells` hold 0-based vertex indices and are written
    /// closed (first vertex repeated), as MODFLOW 6 does.
    pub fn disv(
        nlay: usize,
        vertices: &[(f64, f64)],
        cells: &[Vec<usize>],
        xorigin: f64,
        yorigin: f64,
        angrot: f64,
    ) -> Self {
        let ncpl = cells.len();
        let ncells = ncpl * nlay;
        let nvert = vertices.len();
        let (ia, ja) = diagonal(ncells);

        let mut iavert = vec![1i32];
        let mut javert = Vec::new();
        for cell in cells {
            for &iv in cell {
                javert.push(iv as i32 + 1);
            }
            javert.push(cell[0] as i32 + 1);
            iavert.push(javert.len() as i32 + 1);
        }
        let flat_vertices: Vec<f64> = vertices.iter().flat_map(|&(x, y)| [x, y]).collect();
        let centroids: Vec<(f64, f64)> = cells
            .iter()
            .map(|c| {
                let n = c.len() as f64;
                (
                    c.iter().map(|&i| vertices[i].0).sum::<f64>() / n,
                    c.iter().map(|&i| vertices[i].1).sum::<f64>() / n,
                )
            })
            .collect();
        let njavert = javert.len();

        let arrays = vec![
            ("NCELLS", scalar_i(ncells as i32)),
            ("NLAY", scalar_i(nlay as i32)),
            ("NCPL", scalar_i(ncpl as i32)),
            ("NVERT", scalar_i(nvert as i32)),
            ("NJAVERT", scalar_i(njavert as i32)),
            ("NJA", scalar_i(ncells as i32)),
            ("XORIGIN", scalar_d(xorigin)),
            ("YORIGIN", scalar_d(yorigin)),
            ("ANGROT", scalar_d(angrot)),
            ("TOP", GrbValue::Double(vec![0.0; ncpl], vec![ncpl])),
            ("BOTM", GrbValue::Double(vec![-1.0; ncells], vec![ncells])),
            ("VERTICES", GrbValue::Double(flat_vertices, vec![2, nvert])),
            (
                "CELLX",
                GrbValue::Double(centroids.iter().map(|c| c.0).collect(), vec![ncpl]),
            ),
            (
                "CELLY",
                GrbValue::Double(centroids.iter().map(|c| c.1).collect(), vec![ncpl]),
            ),
            ("IAVERT", GrbValue::Integer(iavert, vec![ncpl + 1])),
            ("JAVERT", GrbValue::Integer(javert, vec![njavert])),
            ("IA", GrbValue::Integer(ia, vec![ncells + 1])),
            ("JA", GrbValue::Integer(ja, vec![ncells])),
            ("IDOMAIN", GrbValue::Integer(vec![1; ncells], vec![ncells])),
            ("ICELLTYPE", GrbValue::Integer(vec![1; ncells], vec![ncells])),
        ];
        Self {
            grid_type: "DISV",
            arrays,
        }
    }

    /// Change the declared grid type, e.g. to produce a DISU header.
    pub fn with_grid_type(mut self, grid_type: &'static str) -> Self {
        self.grid_type = grid_type;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut w = Writer::new(Precision::Double);
        w.text_left(&format!("GRID {}", self.grid_type), 50)
            .text_left("VERSION 1", 50)
            .text_left(&format!("NTXT {}", self.arrays.len()), 50)
            .text_left(&format!("LENTXT {}", LENTXT), 50);

        for (name, value) in &self.arrays {
            let (ty, dims) = match value {
                GrbValue::Integer(_, d) => ("INTEGER", d),
                GrbValue::Double(_, d) => ("DOUBLE", d),
            };
            let mut line = format!("{} {} NDIM {}", name, ty, dims.len());
            for d in dims {
                line.push_str(&format!(" {}", d));
            }
            w.text_left(&line, LENTXT);
        }

        for (_, value) in &self.arrays {
            match value {
                GrbValue::Integer(v, _) => {
                    for &i in v {
                        w.int(i);
                    }
                }
                GrbValue::Double(v, _) => {
                    for &d in v {
                        w.double(d);
                    }
                }
            }
        }
        w.bytes().to_vec()
    }

    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.build())?;
        Ok(())
    }
}
