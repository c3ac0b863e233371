/// Spread `outliers` evenly through `main`, keeping both orders.
///
/// With `k` outliers and `total = main.len() + k`, slot `i` takes the next
/// outlier while one remains and either `main` is used up or
/// `(i + 1) * (k + 1) >= (placed + 1) * total`. Outliers land near
/// `total / (k + 1)`, `2 * total / (k + 1)`, ... rather than clustering at
/// either end of the list.
pub fn interleave<T>(main: Vec<T>, outliers: Vec<T>) -> Vec<T> {
    let outlier_count = outliers.len();
    if outlier_count == 0 {
        return main;
    }
    if main.is_empty() {
        return outliers;
    }

    let total = main.len() + outlier_count;
    let mut main_left = main.len();
    let mut main = main.into_iter();
    let mut outliers = outliers.into_iter();
    let mut placed = 0;
    let mut out = Vec::with_capacity(total);

    for i in 0..total {
        let take_outlier = placed < outlier_count
            && (main_left == 0 || (i + 1) * (outlier_count + 1) >= (placed + 1) * total);
        if take_outlier {
            out.extend(outliers.next());
            placed += 1;
        } else {
            out.extend(main.next());
            main_left -= 1;
        }
    }
    out
}
