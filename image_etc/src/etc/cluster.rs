// 2-means clustering for the T and H modes.
//
// Cluster distances are measured in a rotated "QRS" color basis whose luma
// axis is scaled by an intensity factor, so chroma splits can be favored over
// brightness splits. The starting centers come from a fixed table of
// pseudo-random values, which keeps the encoder deterministic: the table is
// the first 64 outputs of C's rand() after srand(1).
const CLUSTER_SEEDS: [u32; 64] = [
    1804289383, 846930886, 1681692777, 1714636915, 1957747793, 424238335, 719885386, 1649760492,
    596516649, 1189641421, 1025202362, 1350490027, 783368690, 1102520059, 2044897763, 1967513926,
    1365180540, 1540383426, 304089172, 1303455736, 35005211, 521595368, 294702567, 1726956429,
    336465782, 861021530, 278722862, 233665123, 2145174067, 468703135, 1101513929, 1801979802,
    1315634022, 635723058, 1369133069, 1125898167, 1059961393, 2089018456, 628175011, 1656478042,
    1131176229, 1653377373, 859484421, 1914544919, 608413784, 756898537, 1734575198, 1973594324,
    149798315, 2038664370, 1129566413, 184803526, 412776091, 1424268980, 1911759956, 749241873,
    137806862, 42999170, 982906996, 135497281, 511702305, 2084420925, 1937477084, 1827336327,
];

const ATTEMPTS: usize = 10;
const MAX_ROUNDS: usize = 10;

/// Split up to 16 RGB points into two clusters and return the cluster means.
///
/// The returned centers are in RGB order. With fewer than two distinct
/// points, both centers collapse onto the single value.
pub(super) fn cluster2(points: &[[f64; 3]], intensity: f64) -> [[f64; 3]; 2] {
    if points.is_empty() {
        return [[0.0; 3]; 2];
    }
    if points.len() == 1 {
        return [points[0], points[0]];
    }

    // Orthonormal luma/chroma rotation. Intensity 1.0 leaves plain Euclidean
    // RGB distance, 0.0 clusters on chroma alone.
    let kq = intensity / f64::sqrt(3.0);
    let kr = 1.0 / f64::sqrt(2.0);
    let ks = 1.0 / f64::sqrt(6.0);
    let transformed: Vec<[f64; 3]> = points
        .iter()
        .map(|p| {
            [
                (p[0] + p[1] + p[2]) * kq,
                (p[0] - p[2]) * kr,
                (p[0] - 2.0 * p[1] + p[2]) * ks,
            ]
        })
        .collect();

    let n = points.len();
    let mut cursor = 0usize;
    let mut draw = |limit: usize| {
        let value = CLUSTER_SEEDS[cursor % CLUSTER_SEEDS.len()];
        cursor += 1;
        value as usize % limit
    };

    let mut best_centers = [points[0], points[0]];
    let mut best_distortion = f64::MAX;

    for _ in 0..ATTEMPTS {
        let i0 = draw(n);
        let mut i1 = draw(n);
        for _ in 0..CLUSTER_SEEDS.len() {
            if i1 != i0 {
                break;
            }
            i1 = draw(n);
        }
        if i1 == i0 {
            i1 = (i0 + 1) % n;
        }

        let mut centers = [points[i0], points[i1]];
        let mut centers_t = [transformed[i0], transformed[i1]];
        let mut distortion = f64::MAX;
        let mut previous = f64::MAX;

        for _ in 0..MAX_ROUNDS {
            let mut sums = [[0.0f64; 3]; 2];
            let mut counts = [0usize; 2];
            distortion = 0.0;

            for (point, point_t) in points.iter().zip(&transformed) {
                let d0 = squared_distance(point_t, &centers_t[0]);
                let d1 = squared_distance(point_t, &centers_t[1]);
                let cluster = usize::from(d1 < d0);
                distortion += d0.min(d1);
                counts[cluster] += 1;
                for c in 0..3 {
                    sums[cluster][c] += point[c];
                }
            }

            if counts[0] == 0 || counts[1] == 0 || distortion == 0.0 || distortion == previous {
                break;
            }
            previous = distortion;

            for cluster in 0..2 {
                for c in 0..3 {
                    centers[cluster][c] = sums[cluster][c] / counts[cluster] as f64;
                }
                let p = centers[cluster];
                centers_t[cluster] = [
                    (p[0] + p[1] + p[2]) * kq,
                    (p[0] - p[2]) * kr,
                    (p[0] - 2.0 * p[1] + p[2]) * ks,
                ];
            }
        }

        if best_distortion > distortion {
            best_distortion = distortion;
            best_centers = centers;
        }
    }

    best_centers
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    d0 * d0 + d1 * d1 + d2 * d2
}
