//! Currency code to display symbol mapping.
//!
//! Used when formatting totals for mail links and export records. The UI
//! may apply its own locale-aware formatting; this table only supplies the
//! symbol prefix (e.g. `USD` → `$`).

/// Returns the display symbol for an ISO 4217 currency code.
///
/// Unknown codes fall back to the code itself so the amount is still
/// unambiguous in rendered text.
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "AED" => "د.إ",
        "AFN" => "؋",
        "ALL" => "L",
        "AMD" => "֏",
        "ANG" => "ƒ",
        "AOA" => "Kz",
        "ARS" => "$",
        "AUD" => "$",
        "AWG" => "ƒ",
        "AZN" => "₼",
        "BAM" => "KM",
        "BBD" => "$",
        "BDT" => "৳",
        "BGN" => "лв",
        "BHD" => ".د.ب",
        "BIF" => "FBu",
        "BMD" => "$",
        "BND" => "$",
        "BOB" => "$b",
        "BRL" => "R$",
        "BSD" => "$",
        "BTC" => "฿",
        "BTN" => "Nu.",
        "BWP" => "P",
        "BYN" => "Br",
        "BZD" => "BZ$",
        "CAD" => "$",
        "CDF" => "FC",
        "CHF" => "CHF",
        "CLP" => "$",
        "CNY" => "¥",
        "COP" => "$",
        "CRC" => "₡",
        "CUC" => "$",
        "CUP" => "₱",
        "CVE" => "$",
        "CZK" => "Kč",
        "DJF" => "Fdj",
        "DKK" => "kr",
        "DOP" => "RD$",
        "DZD" => "دج",
        "EGP" => "£",
        "ERN" => "Nfk",
        "ETB" => "Br",
        "ETH" => "Ξ",
        "EUR" => "€",
        "FJD" => "$",
        "FKP" => "£",
        "GBP" => "£",
        "GEL" => "₾",
        "GHS" => "GH₵",
        "GIP" => "£",
        "GMD" => "D",
        "GNF" => "FG",
        "GTQ" => "Q",
        "GYD" => "$",
        "HKD" => "$",
        "HNL" => "L",
        "HRK" => "kn",
        "HTG" => "G",
        "HUF" => "Ft",
        "IDR" => "Rp",
        "ILS" => "₪",
        "INR" => "₹",
        "IQD" => "ع.د",
        "IRR" => "﷼",
        "ISK" => "kr",
        "JMD" => "J$",
        "JOD" => "JD",
        "JPY" => "¥",
        "KES" => "KSh",
        "KGS" => "лв",
        "KHR" => "៛",
        "KMF" => "CF",
        "KPW" => "₩",
        "KRW" => "₩",
        "KWD" => "KD",
        "KYD" => "$",
        "KZT" => "лв",
        "LAK" => "₭",
        "LBP" => "£",
        "LKR" => "₨",
        "LRD" => "$",
        "LSL" => "M",
        "LYD" => "LD",
        "MAD" => "MAD",
        "MDL" => "lei",
        "MGA" => "Ar",
        "MKD" => "ден",
        "MMK" => "K",
        "MNT" => "₮",
        "MOP" => "MOP$",
        "MRU" => "UM",
        "MUR" => "₨",
        "MVR" => "Rf",
        "MWK" => "MK",
        "MXN" => "$",
        "MYR" => "RM",
        "MZN" => "MT",
        "NAD" => "$",
        "NGN" => "₦",
        "NIO" => "C$",
        "NOK" => "kr",
        "NPR" => "₨",
        "NZD" => "$",
        "OMR" => "﷼",
        "PAB" => "B/.",
        "PEN" => "S/.",
        "PGK" => "K",
        "PHP" => "₱",
        "PKR" => "₨",
        "PLN" => "zł",
        "PYG" => "Gs",
        "QAR" => "﷼",
        "RON" => "lei",
        "RSD" => "Дин.",
        "RUB" => "₽",
        "RWF" => "R₣",
        "SAR" => "﷼",
        "SBD" => "$",
        "SCR" => "₨",
        "SDG" => "ج.س.",
        "SEK" => "kr",
        "SGD" => "$",
        "SHP" => "£",
        "SLL" => "Le",
        "SOS" => "S",
        "SRD" => "$",
        "SSP" => "£",
        "STN" => "Db",
        "SVC" => "$",
        "SYP" => "£",
        "SZL" => "E",
        "THB" => "฿",
        "TJS" => "SM",
        "TMT" => "T",
        "TND" => "د.ت",
        "TOP" => "T$",
        "TRY" => "₺",
        "TTD" => "TT$",
        "TWD" => "NT$",
        "TZS" => "TSh",
        "UAH" => "₴",
        "UGX" => "USh",
        "USD" => "$",
        "UYU" => "$U",
        "UZS" => "лв",
        "VEF" => "Bs",
        "VND" => "₫",
        "VUV" => "VT",
        "WST" => "WS$",
        "XAF" => "FCFA",
        "XCD" => "$",
        "XOF" => "CFA",
        "XPF" => "₣",
        "YER" => "﷼",
        "ZAR" => "R",
        "ZWD" => "Z$",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbols() {
        assert_eq!(currency_symbol("USD"), "$");
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("GBP"), "£");
        assert_eq!(currency_symbol("JPY"), "¥");
    }

    #[test]
    fn test_unknown_code_falls_back_to_code() {
        assert_eq!(currency_symbol("XYZ"), "XYZ");
    }
}
